//! Check whether a TON address passes the format validation the reward
//! endpoint applies, and show how it decodes.
//!
//! Usage:
//!   cargo run --bin verify_address_format -- <address>

use ton_reward_server::wallet::TonAddress;

fn main() {
    let Some(input) = std::env::args().nth(1) else {
        eprintln!("Usage: verify_address_format <address>");
        std::process::exit(2);
    };

    println!("=== TON Address Format Check ===");
    println!("Input: {}", input);

    match TonAddress::parse(&input) {
        Ok(addr) => {
            println!("✅ Valid");
            println!("  workchain:  {}", addr.workchain);
            println!("  raw form:   {}", addr.to_raw());
            println!("  bounceable: {}", addr.is_bounceable());
            println!("  testnet:    {}", addr.is_testnet());
        }
        Err(e) => {
            println!("❌ Rejected: {}", e);
            std::process::exit(1);
        }
    }
}
