mod app;
mod cli;
mod logging;

fn main() {
    let cli = cli::parse();
    app::run(cli);
}
