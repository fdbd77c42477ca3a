//! Database seeder for Campus development.
//!
//! Seeds one platform admin, the "Oak Elementary" school with its school
//! account, class 5A and one student. Running it twice changes nothing.
//!
//! Usage: cargo run --bin seeder

use anyhow::Context;
use campus_core::auth::{Role, hash_password};
use campus_db::entities::{classes, schools, users};
use campus_db::repositories::{
    ClassInput, ClassRepository, NewUser, SchoolInput, SchoolRepository, StudentInput,
    StudentRepository, UserRepository,
};
use campus_shared::SchoolId;
use sea_orm::{ColumnTrait, Database, DatabaseConnection, EntityTrait, QueryFilter};

const SCHOOL_NAME: &str = "Oak Elementary";
const DEFAULT_PASSWORD: &str = "ChangeMe123!";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let database_url =
        std::env::var("DATABASE_URL").context("DATABASE_URL must be set in environment")?;
    let password =
        std::env::var("SEED_PASSWORD").unwrap_or_else(|_| DEFAULT_PASSWORD.to_string());

    println!("Connecting to database...");
    let db = Database::connect(&database_url).await?;

    println!("Seeding admin account...");
    seed_account(&db, "admin", Role::Admin, None, &password).await?;

    println!("Seeding school...");
    let school = seed_school(&db).await?;

    println!("Seeding school account...");
    seed_account(&db, "oak", Role::School, Some(school), &password).await?;

    println!("Seeding class and student...");
    let class_id = seed_class(&db, school).await?;
    seed_student(&db, class_id).await?;

    println!("Seeding complete!");
    Ok(())
}

async fn seed_account(
    db: &DatabaseConnection,
    username: &str,
    role: Role,
    school_id: Option<SchoolId>,
    password: &str,
) -> anyhow::Result<()> {
    let exists = users::Entity::find()
        .filter(users::Column::Username.eq(username))
        .one(db)
        .await?
        .is_some();
    if exists {
        println!("  {username} already exists, skipping");
        return Ok(());
    }

    UserRepository::new(db)
        .create(NewUser {
            username: username.to_string(),
            email: format!("{username}@campus.local"),
            password_hash: hash_password(password)?,
            role,
            school_id,
            permissions: None,
        })
        .await?;
    println!("  Created {username} ({role})");
    Ok(())
}

async fn seed_school(db: &DatabaseConnection) -> anyhow::Result<SchoolId> {
    if let Some(school) = schools::Entity::find()
        .filter(schools::Column::Name.eq(SCHOOL_NAME))
        .one(db)
        .await?
    {
        return Ok(SchoolId(school.id));
    }

    let school = SchoolRepository::new(db)
        .create(SchoolInput {
            name: SCHOOL_NAME.to_string(),
            address: "1 Acorn Way".to_string(),
            contact: "555-0100".to_string(),
            email: "office@oak.example".to_string(),
        })
        .await?;
    println!("  Created school {} ({})", school.name, school.id);
    Ok(SchoolId(school.id))
}

async fn seed_class(db: &DatabaseConnection, school: SchoolId) -> anyhow::Result<i32> {
    if let Some(class) = classes::Entity::find()
        .filter(classes::Column::SchoolId.eq(school.0))
        .filter(classes::Column::Name.eq("5"))
        .filter(classes::Column::Section.eq("A"))
        .one(db)
        .await?
    {
        return Ok(class.id);
    }

    let class = ClassRepository::new(db)
        .create(ClassInput {
            name: "5".to_string(),
            section: "A".to_string(),
            room: Some("101".to_string()),
            school_id: school,
        })
        .await?;
    Ok(class.id)
}

async fn seed_student(db: &DatabaseConnection, class_id: i32) -> anyhow::Result<()> {
    let students = StudentRepository::new(db);
    let enrolled = students.list_by_class(class_id).await?;
    if enrolled.iter().any(|s| s.roll_no == "1") {
        return Ok(());
    }

    students
        .create(StudentInput {
            name: "Ana".to_string(),
            roll_no: "1".to_string(),
            email: "ana@oak.example".to_string(),
            gender: Some("Female".to_string()),
            class_id,
            user_id: None,
        })
        .await?;
    println!("  Enrolled Ana in class 5A");
    Ok(())
}
