use shopfront_db::{connect_with_config, schema, CatalogSeed, SeedResult, VerificationResult};

use crate::commands::{exit, load_config, runtime, CommandResult, Failure};

pub fn run() -> CommandResult {
    let config = match load_config("seed") {
        Ok(config) => config,
        Err(failure) => return failure,
    };
    let runtime = match runtime("seed") {
        Ok(runtime) => runtime,
        Err(failure) => return failure,
    };

    let result = runtime.block_on(async {
        let pool = connect_with_config(&config.database)
            .await
            .map_err(|error| ("db_connectivity", error.to_string(), exit::DATABASE))?;

        schema::apply(&pool)
            .await
            .map_err(|error| ("schema", error.to_string(), exit::STORAGE))?;

        let seeded = CatalogSeed::load(&pool)
            .await
            .map_err(|error| ("seed_execution", error.to_string(), exit::STORAGE))?;

        let verification = CatalogSeed::verify(&pool)
            .await
            .map_err(|error| ("seed_verification", error.to_string(), exit::VERIFICATION))?;

        pool.close().await;

        let outcome: Result<SeedResult, Failure> = if verification.all_present {
            Ok(seeded)
        } else {
            Err(("seed_verification", verification_message(&verification), exit::VERIFICATION))
        };
        outcome
    });

    match result {
        Ok(seeded) => CommandResult::success("seed", seed_message(&seeded)),
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("seed", error_class, message, exit_code)
        }
    }
}

fn seed_message(seeded: &SeedResult) -> String {
    if seeded.skipped {
        "catalog already has categories; demo catalog not loaded".to_string()
    } else {
        format!(
            "demo catalog loaded: {} categories, {} products",
            seeded.categories, seeded.products
        )
    }
}

fn verification_message(verification: &VerificationResult) -> String {
    let failed_checks = verification
        .checks
        .iter()
        .filter_map(|(check, passed)| (!passed).then_some(*check))
        .collect::<Vec<_>>();
    if failed_checks.is_empty() {
        "Some seed data failed to load".to_string()
    } else {
        format!("Seed verification failed for categories: {}", failed_checks.join(", "))
    }
}
