use std::process::ExitCode;

use dragonfly_linux::cli::{self, Command, Options};
use dragonfly_linux::dispatch::dispatch;
use dragonfly_linux::{DongleError, DongleSession, VENDOR_ID};
use tracing_subscriber::EnvFilter;

fn print_usage() {
    println!("VGN Dragonfly 4K Dongle - USB Control Tool\n");
    println!("USAGE:");
    println!("    sudo dragonfly-linux [OPTIONS]\n");
    println!("OPTIONS:");
    println!("    -pr <HZ>          Polling rate to set the device to");
    println!("                      Values: 125, 250, 500, 1000, 2000, 4000\n");
    println!("    -db <MS>          Debounce delay to set");
    println!("                      Values: 0, 1, 2, 4, 8, 15, 20 (0 = leave unchanged)\n");
    println!("    -ms <VALUE>       Turn Motion Sync on or off");
    println!("                      Values: on, off\n");
    println!("    -pid <HEX>        Product ID of the device (default: f505, 4K dongle)");
    println!("                      Only one setting can be changed per run unless");
    println!("                      a product ID is given.\n");
    println!("    -h, -help         Show this help message\n");
    println!("EXAMPLES:");
    println!("    sudo dragonfly-linux -pr 1000");
    println!("    sudo dragonfly-linux -db=4");
    println!("    sudo dragonfly-linux -ms on");
    println!("    sudo dragonfly-linux -pid f501 -pr 4000 -ms off");
    println!("\nLOGGING:");
    println!("    Set RUST_LOG=debug to trace USB setup and transfers.");
}

fn run(options: &Options) -> Result<(), DongleError> {
    let session = DongleSession::open(VENDOR_ID, &options.product_id)?;
    tracing::debug!(
        "Session ready on {:04x}:{:04x}, configuration {:?}, interfaces {:?}",
        session.vendor_id(),
        session.product_id(),
        session.configuration(),
        session.interfaces()
    );
    dispatch(options, &session)?;
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let options = match cli::parse_args(std::env::args().skip(1)) {
        Ok(Command::Help) => {
            print_usage();
            return ExitCode::SUCCESS;
        }
        Ok(Command::Apply(options)) => options,
        Err(e) => {
            eprintln!("Error: {}", e);
            if e.is_usage() {
                eprintln!("Run with -h for usage.");
                return ExitCode::from(2);
            }
            return ExitCode::FAILURE;
        }
    };

    // TODO: this refusal exits 0 although nothing was applied; confirm with
    // the product owner whether it should report failure instead.
    if options.too_many_settings() {
        println!("Changing more than 1 setting at one go is not supported");
        return ExitCode::SUCCESS;
    }

    match run(&options) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!(error = ?e, "fatal");
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
