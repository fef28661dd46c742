//! Interactive wallet form on stdin/stdout.
//!
//! Mirrors the single-screen wallet form: type the phrase, destination and
//! amount, then `connect` or `send`. The screen is redrawn after each command
//! and the price refreshes in the background.

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tonpad_wallet::{Session, ViewState};

const HELP: &str = "\
commands:
  mnemonic          enter the 24-word phrase (hidden)
  to <address>      set the destination address
  amount <ton>      set the amount to send
  connect           derive the address and fetch balance
  send              send the amount to the destination
  show              redraw the form
  help              show this help
  quit              leave";

/// One line of user input.
#[derive(Debug, PartialEq, Eq)]
enum Command {
    Mnemonic,
    Destination(String),
    Amount(String),
    Connect,
    Send,
    Show,
    Help,
    Quit,
    Unknown(String),
}

fn parse_command(line: &str) -> Command {
    let line = line.trim();
    let (head, rest) = match line.split_once(char::is_whitespace) {
        Some((h, r)) => (h, r.trim()),
        None => (line, ""),
    };
    match head.to_lowercase().as_str() {
        "mnemonic" | "m" => Command::Mnemonic,
        "to" | "destination" => Command::Destination(rest.to_string()),
        "amount" | "a" => Command::Amount(rest.to_string()),
        "connect" | "c" => Command::Connect,
        "send" | "s" => Command::Send,
        "" | "show" => Command::Show,
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        _ => Command::Unknown(line.to_string()),
    }
}

/// Render the form the way the wallet screen lays it out.
pub fn render(view: &ViewState) -> String {
    let mut out = String::from("== TON Wallet Address from Mnemonic ==\n");
    let words = view.mnemonic.split_whitespace().count();
    out.push_str(&format!("Mnemonic: {}\n", if words == 0 {
        "(not set)".to_string()
    } else {
        format!("({words} words)")
    }));
    if let Some(err) = &view.error {
        out.push_str(&format!("! {err}\n"));
    }
    if let Some(wallet) = &view.wallet {
        out.push_str(&format!("Wallet Address: {}\n", wallet.derived_address));
        let usd = view
            .usd_value_display()
            .map(|v| format!("     {v}$"))
            .unwrap_or_default();
        out.push_str(&format!("Balance: {}{usd}\n", wallet.balance()));
        out.push_str(&format!("NFTs: {}\n", wallet.nft_count));
        out.push_str(&format!("Jettons: {}\n", wallet.jetton_count));
        if let Some(price) = view.price_display() {
            out.push_str(&format!("TON Price: ${price}\n"));
        }
    }
    out.push_str(&format!(
        "Address To send: {}\n",
        view.pending.destination_address
    ));
    out.push_str(&format!("send Amount: {}\n", view.pending.amount_string));
    out
}

/// Run the form until `quit` or end of input.
pub async fn run(session: &Session) -> Result<()> {
    session.start_price_ticker();
    println!("{HELP}\n");
    println!("{}", render(&session.snapshot()));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("Failed to read input")? {
        match parse_command(&line) {
            Command::Mnemonic => {
                let phrase = tokio::task::spawn_blocking(|| {
                    rpassword::prompt_password("Enter your mnemonic phrase: ")
                })
                .await?
                .context("Failed to read mnemonic")?;
                session.set_mnemonic(phrase);
            }
            Command::Destination(dest) => session.set_destination(dest),
            Command::Amount(amount) => session.set_amount(amount),
            Command::Connect => {
                // the outcome is reflected in the view state
                let _ = session.connect().await;
            }
            Command::Send => {
                let _ = session.send().await;
                if let Some(notice) = session.take_notice() {
                    println!(">> {notice}");
                }
            }
            Command::Show => {}
            Command::Help => {
                println!("{HELP}");
                continue;
            }
            Command::Quit => break,
            Command::Unknown(input) => {
                println!("unknown command: {input} (try 'help')");
                continue;
            }
        }
        println!("{}", render(&session.snapshot()));
    }

    session.stop_price_ticker();
    Ok(())
}
