//! Sign command implementation

use anyhow::Result;
use clap::Parser;
use colored::Colorize;

use hookhub_console::signature;

/// Compute or verify the signature header of a webhook body
#[derive(Debug, Clone, Parser)]
pub struct SignArgs {
    /// Subscription signing secret
    #[arg(short, long, env = "HOOKHUB_SECRET", hide_env_values = true)]
    pub secret: String,

    /// Exact request body
    #[arg(short, long)]
    pub payload: String,

    /// Header value to check instead of printing a new one
    #[arg(long, value_name = "HEADER")]
    pub verify: Option<String>,
}

/// Execute the sign command
pub fn execute(args: SignArgs) -> Result<()> {
    match args.verify {
        Some(header) => {
            if signature::verify(&args.secret, &args.payload, &header)? {
                println!("{}", "✓ Signature is valid".green());
                Ok(())
            } else {
                anyhow::bail!("Signature does not match payload")
            }
        }
        None => {
            println!("{}", signature::sign(&args.secret, &args.payload)?);
            Ok(())
        }
    }
}
