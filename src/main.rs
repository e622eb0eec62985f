fn main() {
    if let Err(err) = netstat_dash::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
