use clap::Parser;

fn main() {
    let options = tabspot_core::runtime::CliOptions::parse();

    match tabspot_core::runtime::run_with_options(options) {
        Ok(report) => println!("[tabspot] {}", tabspot_core::runtime::describe(&report)),
        Err(error) => {
            eprintln!("[tabspot] switch failed: {error}");
            std::process::exit(1);
        }
    }
}
