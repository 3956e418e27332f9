fn main() -> Result<(), anyhow::Error> {
    proc_cli::run()
}
