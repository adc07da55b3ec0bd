use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    chitchat::logging::init();
    chitchat::cli::main()
}
