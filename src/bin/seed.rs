use anyhow::Context;
use chrono::Utc;
use course_market_api::{
    db::{create_orm_conn, run_migrations},
    entity::courses::{ActiveModel as CourseActive, Column as CourseCol, Entity as Courses},
};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

/// Inserts demo courses owned by `SEED_ADMIN_ID` (a fresh id when unset).
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL is not set")?;
    let admin_id = match std::env::var("SEED_ADMIN_ID") {
        Ok(raw) => Uuid::parse_str(&raw).context("SEED_ADMIN_ID must be a UUID")?,
        Err(_) => Uuid::new_v4(),
    };

    let orm = create_orm_conn(&database_url).await?;
    run_migrations(&orm).await?;

    let courses = [
        ("Algorithms", "Sorting, graphs and dynamic programming", 899.0),
        ("Async Rust", "Futures, executors and structured concurrency", 1299.0),
        ("Databases 101", "Relational modelling and SQL from scratch", 499.0),
        ("System Design", "Scaling web services step by step", 1499.0),
    ];

    for (title, description, price) in courses {
        let exists = Courses::find()
            .filter(CourseCol::Title.eq(title))
            .one(&orm)
            .await?
            .is_some();
        if exists {
            println!("Skipping existing course {title}");
            continue;
        }

        let now = Utc::now();
        CourseActive {
            id: Set(Uuid::new_v4()),
            title: Set(title.to_string()),
            description: Set(description.to_string()),
            price: Set(price),
            image_public_id: Set(format!("seed/{}", title.to_lowercase().replace(' ', "-"))),
            image_url: Set("https://placehold.co/600x400".to_string()),
            creator_id: Set(admin_id),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        }
        .insert(&orm)
        .await?;
        println!("Seeded course {title}");
    }

    println!("Seed completed. Admin ID: {admin_id}");
    Ok(())
}
