use clap::Args;
use sqlx::PgPool;
use storefront::catalog::ProductUuid;
use storefront_app::{
    database::Db,
    domain::products::{PgProductsService, ProductsService, data::NewProduct},
};
use uuid::Uuid;

#[derive(Debug, Args)]
pub(crate) struct CreateProductArgs {
    /// Product display name
    #[arg(long)]
    name: String,

    /// Single-unit price in whole rupees
    #[arg(long)]
    price: u64,

    /// Product image URL
    #[arg(long)]
    image: Option<String>,

    /// Optional product UUID; generated when omitted
    #[arg(long)]
    product_uuid: Option<Uuid>,
}

pub(crate) async fn run(args: CreateProductArgs, pool: PgPool) -> Result<(), String> {
    let service = PgProductsService::new(Db::new(pool));

    let product = service
        .create_product(NewProduct {
            uuid: args
                .product_uuid
                .map_or_else(ProductUuid::new, ProductUuid::from_uuid),
            name: args.name,
            image: args.image,
            base_price: args.price,
        })
        .await
        .map_err(|error| format!("failed to create product: {error}"))?;

    println!("product_uuid: {}", product.uuid);
    println!("name: {}", product.name);
    println!(
        "prices: single {} / double {} / triple {}",
        product.bundle_pricing.single, product.bundle_pricing.double, product.bundle_pricing.triple
    );

    Ok(())
}
