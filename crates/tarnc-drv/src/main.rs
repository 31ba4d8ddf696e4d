use tarnc_drv::{Config, Session};

fn main() {
    let config = match Config::from_args(std::env::args().skip(1)) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {}", e);
            eprintln!("usage: tarnc [--unparse] [--verbose] [-o <output>] <input.tn>");
            std::process::exit(2);
        }
    };

    if let Err(e) = Session::new(config).compile() {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
