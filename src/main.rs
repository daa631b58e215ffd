mod cli;
mod commands;
mod env_loader;
mod error;
mod trending;

fn main() {
    env_loader::load_dotenv();

    match cli::run() {
        Ok(true) => {}
        Ok(false) => std::process::exit(2),
        Err(err) => {
            match error::error_code(&err) {
                Some(code) => eprintln!("error[{}]: {err:#}", code.as_str()),
                None => eprintln!("error: {err:#}"),
            }
            std::process::exit(1);
        }
    }
}
