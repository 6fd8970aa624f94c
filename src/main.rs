//! furnika - command-line front end for the furniture storefront

use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use furnika::{
    cache::create_cache,
    client::ApiClient,
    config::Config,
    models::{Language, NewProduct, NewsArticleInput, PromotionInput, ROLE_ADMIN},
    services::{
        landing_route, AdminService, CatalogService, GuardDecision, LoginInput, RegisterInput,
        RouteGuard, SessionManager,
    },
    storage::create_store,
};

#[derive(Parser)]
#[command(name = "furnika", version, about = "Furniture storefront client")]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "config.yml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Sign in with username and password
    Login {
        #[arg(short, long)]
        username: String,
        #[arg(short, long)]
        password: String,
    },
    /// Finish an OAuth login from the redirect URL
    OauthCallback { url: String },
    /// Sign out
    Logout,
    /// Show the current session
    Whoami,
    /// Check whether the current session may open a screen
    Guard {
        #[arg(default_value = ROLE_ADMIN)]
        role: String,
    },
    /// Create an account
    Register {
        #[arg(short, long)]
        username: String,
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        password: String,
    },
    /// Request a password reset mail
    ForgotPassword { email: String },
    /// Set a new password with the token from the reset mail
    ResetPassword {
        #[arg(short, long)]
        token: String,
        #[arg(short, long)]
        password: String,
    },
    /// List categories
    Categories,
    /// List products
    Products {
        /// Only products of this category
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        page: Option<u32>,
        #[arg(long)]
        size: Option<u32>,
    },
    /// Show the latest news
    News,
    /// List running promotions
    Promotions {
        #[arg(long, default_value_t = 0)]
        page: u32,
        #[arg(long)]
        size: Option<u32>,
    },
    /// Back-office operations (administrators only)
    #[command(subcommand)]
    Admin(AdminCommand),
}

#[derive(Subcommand)]
enum AdminCommand {
    /// Create a category
    CreateCategory {
        name: String,
        #[arg(long)]
        slug: Option<String>,
    },
    /// Delete a category
    DeleteCategory { id: i64 },
    /// Set the image of a category
    CategoryImage { id: i64, image_url: String },
    /// Create a product
    CreateProduct {
        #[command(flatten)]
        product: ProductArgs,
    },
    /// Replace a product
    UpdateProduct {
        id: i64,
        #[command(flatten)]
        product: ProductArgs,
    },
    /// Delete a product
    DeleteProduct { id: i64 },
    /// List all news articles
    News {
        #[arg(long, default_value_t = 0)]
        page: u32,
    },
    /// Publish a news article, translated into all languages
    PublishNews {
        #[arg(long)]
        title: String,
        #[arg(long)]
        content: String,
        #[arg(long, default_value = "")]
        image_url: String,
    },
    /// Replace a news article, translated into all languages
    UpdateNews {
        id: i64,
        #[arg(long)]
        title: String,
        #[arg(long)]
        content: String,
        #[arg(long, default_value = "")]
        image_url: String,
    },
    /// Delete a news article
    DeleteNews { id: i64 },
    /// List all promotions
    Promotions {
        #[arg(long, default_value_t = 0)]
        page: u32,
    },
    /// Create a promotion
    CreatePromotion {
        #[command(flatten)]
        promotion: PromotionArgs,
    },
    /// Replace a promotion
    UpdatePromotion {
        id: i64,
        #[command(flatten)]
        promotion: PromotionArgs,
    },
    /// Delete a promotion
    DeletePromotion { id: i64 },
}

#[derive(Args)]
struct ProductArgs {
    #[arg(long)]
    name: String,
    #[arg(long, default_value = "")]
    description: String,
    #[arg(long)]
    price: f64,
    #[arg(long, default_value = "")]
    image_url: String,
    #[arg(long)]
    category_id: i64,
}

impl From<ProductArgs> for NewProduct {
    fn from(args: ProductArgs) -> Self {
        NewProduct {
            name: args.name,
            description: args.description,
            price: args.price,
            image_url: args.image_url,
            category_id: args.category_id,
        }
    }
}

/// German text only; translations can be added through the library API
#[derive(Args)]
struct PromotionArgs {
    #[arg(long)]
    name: String,
    #[arg(long, default_value = "")]
    description: String,
    #[arg(long)]
    price: f64,
    #[arg(long)]
    size: Option<String>,
    #[arg(long, default_value = "")]
    image_url: String,
    /// First day, YYYY-MM-DD
    #[arg(long)]
    start: NaiveDate,
    /// Last day, YYYY-MM-DD
    #[arg(long)]
    end: NaiveDate,
}

impl From<PromotionArgs> for PromotionInput {
    fn from(args: PromotionArgs) -> Self {
        let mut input =
            PromotionInput::new(args.name, args.description, args.price, args.start, args.end);
        input.size = args.size;
        input.image_url = args.image_url;
        input
    }
}

struct App {
    sessions: Arc<SessionManager>,
    catalog: CatalogService,
    admin: AdminService,
    language: Language,
}

impl App {
    fn build(config: &Config) -> Result<Self> {
        let store = create_store(&config.storage)?;
        let cache = create_cache(&config.cache);
        let client = ApiClient::new(&config.api)?;

        let sessions = Arc::new(SessionManager::new(client.clone(), store));
        let authed = client.with_token_source(sessions.clone());

        Ok(Self {
            catalog: CatalogService::new(authed.clone(), cache.clone()),
            admin: AdminService::new(authed, sessions.clone(), cache),
            sessions,
            language: config.locale.language,
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load_with_env(&cli.config)?;

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log.filter.as_str().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::debug!("Configuration loaded from {}", cli.config.display());

    let app = App::build(&config)?;
    app.sessions.refresh();

    run(&app, cli.command).await
}

async fn run(app: &App, command: Command) -> Result<()> {
    match command {
        Command::Login { username, password } => {
            let session = app
                .sessions
                .login(LoginInput::new(username, password))
                .await
                .map_err(|e| anyhow!(e.user_message()))?;
            println!("Signed in as {}", session.username);
            println!("Continue at {}", landing_route(&session));
        }
        Command::OauthCallback { url } => match app.sessions.complete_oauth_redirect(&url) {
            Ok(session) => {
                println!("Signed in as {}", session.username);
                println!("Continue at {}", landing_route(&session));
            }
            Err(failure) => {
                println!("OAuth login failed: {}", failure.reason());
                println!("Continue at {}", failure.login_redirect());
            }
        },
        Command::Logout => {
            app.sessions.logout();
            println!("Signed out");
        }
        Command::Whoami => match app.sessions.current_session() {
            Some(session) => {
                println!("{} (id {})", session.username, session.id);
                if !session.email.is_empty() {
                    println!("email: {}", session.email);
                }
                println!("roles: {}", session.roles.join(", "));
            }
            None => println!("Not signed in"),
        },
        Command::Guard { role } => match RouteGuard::new(&app.sessions).check(&role) {
            GuardDecision::Allow => println!("allow"),
            GuardDecision::Redirect(path) => println!("redirect {}", path),
        },
        Command::Register {
            username,
            email,
            password,
        } => {
            let message = app
                .sessions
                .register(RegisterInput {
                    username,
                    email,
                    password,
                })
                .await
                .map_err(|e| anyhow!(e.user_message()))?;
            println!("{}", message);
        }
        Command::ForgotPassword { email } => {
            let message = app
                .sessions
                .forgot_password(&email)
                .await
                .map_err(|e| anyhow!(e.user_message()))?;
            println!("{}", message);
        }
        Command::ResetPassword { token, password } => {
            let message = app
                .sessions
                .reset_password(&token, &password)
                .await
                .map_err(|e| anyhow!(e.user_message()))?;
            println!("{}", message);
        }
        Command::Categories => {
            let categories = app
                .catalog
                .categories()
                .await
                .map_err(|e| anyhow!(e.user_message()))?;
            for category in categories {
                println!("{:>4}  {:<24} /{}", category.id, category.name, category.slug);
            }
        }
        Command::Products {
            category,
            page,
            size,
        } => {
            let products = match (category, page) {
                (Some(slug), _) => app.catalog.products_by_category(&slug).await,
                (None, Some(page)) => app
                    .catalog
                    .products_page(page, size)
                    .await
                    .map(|page| page.content),
                (None, None) => app.catalog.products().await,
            }
            .map_err(|e| anyhow!(e.user_message()))?;
            for product in products {
                println!(
                    "{:>4}  {:<32} {:>10.2}  {}",
                    product.id, product.name, product.price, product.category.name
                );
            }
        }
        Command::News => {
            let articles = app
                .catalog
                .latest_news()
                .await
                .map_err(|e| anyhow!(e.user_message()))?;
            for article in articles {
                println!("{}  {}", article.created_at, article.title(app.language));
            }
        }
        Command::Promotions { page, size } => {
            let promotions = app
                .catalog
                .active_promotions(page, size)
                .await
                .map_err(|e| anyhow!(e.user_message()))?;
            for promotion in &promotions.content {
                println!(
                    "{:>4}  {:<32} {:>10.2}  {} - {}",
                    promotion.id,
                    promotion.name(app.language),
                    promotion.price,
                    promotion.start_date,
                    promotion.end_date
                );
            }
            println!("page {} of {}", promotions.number + 1, promotions.total_pages.max(1));
        }
        Command::Admin(command) => run_admin(app, command).await?,
    }
    Ok(())
}

async fn run_admin(app: &App, command: AdminCommand) -> Result<()> {
    let admin = &app.admin;
    match command {
        AdminCommand::CreateCategory { name, slug } => {
            let category = admin
                .create_category(&name, slug.as_deref())
                .await
                .map_err(|e| anyhow!(e.user_message()))?;
            println!("Created category {} /{}", category.id, category.slug);
        }
        AdminCommand::DeleteCategory { id } => {
            admin
                .delete_category(id)
                .await
                .map_err(|e| anyhow!(e.user_message()))?;
            println!("Deleted category {}", id);
        }
        AdminCommand::CategoryImage { id, image_url } => {
            admin
                .update_category_image(id, &image_url)
                .await
                .map_err(|e| anyhow!(e.user_message()))?;
            println!("Updated image of category {}", id);
        }
        AdminCommand::CreateProduct { product } => {
            let product = admin
                .create_product(product.into())
                .await
                .map_err(|e| anyhow!(e.user_message()))?;
            println!("Created product {}", product.id);
        }
        AdminCommand::UpdateProduct { id, product } => {
            admin
                .update_product(id, product.into())
                .await
                .map_err(|e| anyhow!(e.user_message()))?;
            println!("Updated product {}", id);
        }
        AdminCommand::DeleteProduct { id } => {
            admin
                .delete_product(id)
                .await
                .map_err(|e| anyhow!(e.user_message()))?;
            println!("Deleted product {}", id);
        }
        AdminCommand::News { page } => {
            let articles = admin
                .news_page(page, None)
                .await
                .map_err(|e| anyhow!(e.user_message()))?;
            for article in &articles.content {
                println!("{:>4}  {}", article.id, article.title(app.language));
            }
            println!("page {} of {}", articles.number + 1, articles.total_pages.max(1));
        }
        AdminCommand::PublishNews {
            title,
            content,
            image_url,
        } => {
            let input = translated_news(admin, title, content, image_url).await?;
            let article = admin
                .create_news(input)
                .await
                .map_err(|e| anyhow!(e.user_message()))?;
            println!("Published news article {}", article.id);
        }
        AdminCommand::UpdateNews {
            id,
            title,
            content,
            image_url,
        } => {
            let input = translated_news(admin, title, content, image_url).await?;
            admin
                .update_news(id, input)
                .await
                .map_err(|e| anyhow!(e.user_message()))?;
            println!("Updated news article {}", id);
        }
        AdminCommand::DeleteNews { id } => {
            admin
                .delete_news(id)
                .await
                .map_err(|e| anyhow!(e.user_message()))?;
            println!("Deleted news article {}", id);
        }
        AdminCommand::Promotions { page } => {
            let promotions = admin
                .promotions_page(page, None)
                .await
                .map_err(|e| anyhow!(e.user_message()))?;
            for promotion in &promotions.content {
                println!(
                    "{:>4}  {:<32} {} - {}",
                    promotion.id,
                    promotion.name(app.language),
                    promotion.start_date,
                    promotion.end_date
                );
            }
        }
        AdminCommand::CreatePromotion { promotion } => {
            let promotion = admin
                .create_promotion(promotion.into())
                .await
                .map_err(|e| anyhow!(e.user_message()))?;
            println!("Created promotion {}", promotion.id);
        }
        AdminCommand::UpdatePromotion { id, promotion } => {
            admin
                .update_promotion(id, promotion.into())
                .await
                .map_err(|e| anyhow!(e.user_message()))?;
            println!("Updated promotion {}", id);
        }
        AdminCommand::DeletePromotion { id } => {
            admin
                .delete_promotion(id)
                .await
                .map_err(|e| anyhow!(e.user_message()))?;
            println!("Deleted promotion {}", id);
        }
    }
    Ok(())
}

async fn translated_news(
    admin: &AdminService,
    title: String,
    content: String,
    image_url: String,
) -> Result<NewsArticleInput> {
    let translation = admin
        .translate_news(&title, &content)
        .await
        .map_err(|e| anyhow!(e.user_message()))?;
    Ok(NewsArticleInput::new(title, content)
        .with_image(image_url)
        .with_translation(translation))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn admin_command(args: &[&str]) -> AdminCommand {
        let argv = ["furnika", "admin"].iter().chain(args.iter());
        match Cli::try_parse_from(argv).unwrap().command {
            Command::Admin(command) => command,
            _ => panic!("expected an admin command"),
        }
    }

    #[test]
    fn test_parse_update_product() {
        let command = admin_command(&[
            "update-product", "7", "--name", "Sofa", "--price", "899.5", "--category-id", "2",
        ]);
        match command {
            AdminCommand::UpdateProduct { id, product } => {
                assert_eq!(id, 7);
                let product = NewProduct::from(product);
                assert_eq!(product.name, "Sofa");
                assert_eq!(product.price, 899.5);
                assert_eq!(product.category_id, 2);
                assert_eq!(product.description, "");
            }
            _ => panic!("expected update-product"),
        }
    }

    #[test]
    fn test_parse_update_news() {
        let command = admin_command(&[
            "update-news", "3", "--title", "Sommerfest", "--content", "Kommen Sie vorbei",
        ]);
        assert!(matches!(
            command,
            AdminCommand::UpdateNews { id: 3, ref title, .. } if title == "Sommerfest"
        ));
    }

    #[test]
    fn test_parse_create_and_update_promotion() {
        let args = [
            "--name", "Winterschlussverkauf", "--price", "199", "--size", "200x90",
            "--start", "2026-01-10", "--end", "2026-01-31",
        ];

        let mut create = vec!["create-promotion"];
        create.extend(args);
        match admin_command(&create) {
            AdminCommand::CreatePromotion { promotion } => {
                let input = PromotionInput::from(promotion);
                assert_eq!(input.name_de, "Winterschlussverkauf");
                assert_eq!(input.size.as_deref(), Some("200x90"));
                assert_eq!(input.start_date, NaiveDate::from_ymd_opt(2026, 1, 10).unwrap());
                assert_eq!(input.end_date, NaiveDate::from_ymd_opt(2026, 1, 31).unwrap());
            }
            _ => panic!("expected create-promotion"),
        }

        let mut update = vec!["update-promotion", "12"];
        update.extend(args);
        assert!(matches!(
            admin_command(&update),
            AdminCommand::UpdatePromotion { id: 12, .. }
        ));
    }

    #[test]
    fn test_parse_rejects_bad_date() {
        let argv = [
            "furnika", "admin", "create-promotion", "--name", "A", "--price", "1",
            "--start", "10.01.2026", "--end", "2026-01-31",
        ];
        assert!(Cli::try_parse_from(argv).is_err());
    }
}
