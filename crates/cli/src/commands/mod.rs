//! CLI subcommand implementations.

use sandbar_client::ApiClient;

pub mod catalog;
pub mod checkout;

/// Format a cent amount for display (e.g. `$15.99`).
pub(crate) fn format_cents(cents: u64) -> String {
    format!("${}.{:02}", cents / 100, cents % 100)
}

/// Print the client's recently recorded correlation ids.
pub(crate) fn print_trace_ids(client: &ApiClient) {
    let ids = client.recent_trace_ids();
    if ids.is_empty() {
        return;
    }
    println!();
    println!("Recent trace IDs:");
    for id in ids {
        println!("  {id}");
    }
}
