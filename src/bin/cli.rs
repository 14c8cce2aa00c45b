//! QuorumKV CLI Client
//!
//! Command-line interface for interacting with QuorumKV (or any RESP server).

use std::io::{BufReader, BufWriter};
use std::net::TcpStream;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use quorumkv::protocol::{read_reply, write_command, Command, Reply};
use quorumkv::Result;

/// QuorumKV CLI
#[derive(Parser, Debug)]
#[command(name = "quorumkv-cli")]
#[command(about = "CLI for the QuorumKV key-value store")]
struct Args {
    /// Server address
    #[arg(short, long, default_value = "127.0.0.1:6379")]
    server: String,

    /// Retry once against the leader when redirected
    #[arg(short, long)]
    follow: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Get a value by key
    Get {
        /// The key to get
        key: String,
    },

    /// Set a key-value pair
    Set {
        /// The key to set
        key: String,

        /// The value to set
        value: String,
    },

    /// Delete a key
    Del {
        /// The key to delete
        key: String,
    },
}

impl Commands {
    fn to_command(&self) -> Command {
        match self {
            Commands::Get { key } => Command::from_parts(["GET", key.as_str()]),
            Commands::Set { key, value } => Command::from_parts(["SET", key.as_str(), value.as_str()]),
            Commands::Del { key } => Command::from_parts(["DEL", key.as_str()]),
        }
    }
}

fn send(addr: &str, command: &Command) -> Result<Reply> {
    let stream = TcpStream::connect(addr)?;
    let mut writer = BufWriter::new(stream.try_clone()?);
    let mut reader = BufReader::new(stream);

    write_command(&mut writer, command)?;
    read_reply(&mut reader)
}

fn main() -> ExitCode {
    let args = Args::parse();
    let command = args.command.to_command();

    let mut reply = match send(&args.server, &command) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("(error) {}", e);
            return ExitCode::FAILURE;
        }
    };

    if args.follow {
        if let Some(leader) = reply.redirect_addr().map(str::to_string) {
            eprintln!("-> Redirected to {}", leader);
            reply = match send(&leader, &command) {
                Ok(r) => r,
                Err(e) => {
                    eprintln!("(error) {}", e);
                    return ExitCode::FAILURE;
                }
            };
        }
    }

    match reply {
        Reply::Simple(text) => println!("{}", text),
        Reply::Integer(n) => println!("(integer) {}", n),
        Reply::Bulk(value) => println!("\"{}\"", String::from_utf8_lossy(&value)),
        Reply::Null => println!("(nil)"),
        Reply::Error(text) => {
            println!("(error) {}", text);
            return ExitCode::FAILURE;
        }
    }

    ExitCode::SUCCESS
}
