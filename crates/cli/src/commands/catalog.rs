//! Catalog listing command.

use sandbar_client::ApiClient;

/// Fetch the catalog and print one line per product.
pub async fn run(
    client: &ApiClient,
    include_inventory: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let products = client.catalog(include_inventory).await?;

    if products.is_empty() {
        println!("No products in the catalog.");
    }
    for product in &products {
        let price = super::format_cents(product.price_cents);
        match product.inventory {
            Some(count) => println!(
                "#{:<4} {:<32} {:>9}  ({count} in stock)",
                product.id.as_i64(),
                product.name,
                price
            ),
            None => println!(
                "#{:<4} {:<32} {:>9}",
                product.id.as_i64(),
                product.name,
                price
            ),
        }
    }

    super::print_trace_ids(client);
    Ok(())
}
