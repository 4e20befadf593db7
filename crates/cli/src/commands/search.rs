use clap::Args;
use rust_decimal::Decimal;
use shopfront_core::filter::ProductFilter;
use shopfront_db::{connect_with_config, schema, ProductRepository, SqlProductRepository};

use crate::commands::{exit, load_config, runtime, CommandResult, Failure};

#[derive(Debug, Default, Args)]
pub struct SearchArgs {
    #[arg(long, help = "Only products in this category id")]
    pub category: Option<i64>,
    #[arg(long, help = "Inclusive lower price bound")]
    pub min_price: Option<Decimal>,
    #[arg(long, help = "Inclusive upper price bound")]
    pub max_price: Option<Decimal>,
    #[arg(long, help = "Exact sub-category; an empty value is ignored")]
    pub subcategory: Option<String>,
}

impl SearchArgs {
    pub fn filter(&self) -> ProductFilter {
        ProductFilter::from_raw(self.category, self.min_price, self.max_price, self.subcategory.clone())
    }
}

pub fn run(args: &SearchArgs) -> CommandResult {
    let config = match load_config("search") {
        Ok(config) => config,
        Err(failure) => return failure,
    };
    let runtime = match runtime("search") {
        Ok(runtime) => runtime,
        Err(failure) => return failure,
    };
    let filter = args.filter();

    let result = runtime.block_on(async {
        let pool = connect_with_config(&config.database)
            .await
            .map_err(|error| ("db_connectivity", error.to_string(), exit::DATABASE))?;
        schema::apply(&pool)
            .await
            .map_err(|error| ("schema", error.to_string(), exit::STORAGE))?;

        let products = SqlProductRepository::new(pool.clone()).search(&filter).await;
        pool.close().await;

        let outcome: Result<_, Failure> =
            products.map_err(|error| ("search", error.to_string(), exit::STORAGE));
        outcome
    });

    match result.and_then(|products| {
        serde_json::to_value(&products)
            .map(|data| (products.len(), data))
            .map_err(|error| ("serialization", error.to_string(), exit::STORAGE))
    }) {
        Ok((count, data)) => {
            CommandResult::success_with_data("search", format!("{count} products matched"), Some(data))
        }
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("search", error_class, message, exit_code)
        }
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use shopfront_core::domain::category::CategoryId;
    use shopfront_core::filter::ProductFilter;

    use super::SearchArgs;

    #[test]
    fn args_map_onto_filter() {
        let args = SearchArgs {
            category: Some(2),
            min_price: None,
            max_price: Some(Decimal::new(30, 0)),
            subcategory: Some(String::new()),
        };

        assert_eq!(
            args.filter(),
            ProductFilter::all().with_category(CategoryId(2)).with_max_price(Decimal::new(30, 0))
        );
    }

    #[test]
    fn no_args_is_the_identity_filter() {
        assert!(SearchArgs::default().filter().is_identity());
    }
}
