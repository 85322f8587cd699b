fn main() -> anyhow::Result<()> {
    tidepool::app::run()
}
