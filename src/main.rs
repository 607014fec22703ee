fn main() {
    if let Err(err) = gsc_ctr_stats::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
