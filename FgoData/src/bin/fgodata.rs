fn main() -> anyhow::Result<()> {
    fgodata::cli::run_cli()
}
