//! Simple command that prints one or 'count' time-based identifiers

use std::{env, io, io::Write, process::ExitCode};

fn main() -> io::Result<ExitCode> {
    let count = match env::args().nth(1) {
        None => 1,
        Some(arg) => match arg.parse::<usize>() {
            Ok(n) => n,
            Err(_) => {
                eprintln!("Usage: tuid [count]");
                return Ok(ExitCode::FAILURE);
            }
        },
    };

    let mut buf = io::BufWriter::new(io::stdout());
    for _ in 0..count {
        writeln!(buf, "{}", tuid::tuid())?;
    }

    Ok(ExitCode::SUCCESS)
}
