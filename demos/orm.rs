use dragon_orm::orm::combined_defaults;
use dragon_orm::{Config, OrmExtension};
use tracing::Level;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> Result<(), dragon_orm::Error> {
    // Library events on stderr, debug and up
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env().add_directive(Level::DEBUG.into()))
        .try_init();

    // Defaults first, then the file, then DEMO__* variables
    let config = Config::builder()
        .with_defaults(combined_defaults())
        .with_file("demos/orm.toml", true)
        .with_file("demos/orm.local.toml", false)
        .with_env("DEMO", "__")
        .build()?;

    let ext = OrmExtension::builder()
        .with_config(config)
        .with_project_root(std::env::current_dir().unwrap_or_default())
        .build()?;

    for cache in ext.caches() {
        println!(
            "{:<36} {:<10} {}",
            cache.namespace,
            cache.driver,
            cache.service.as_deref().unwrap_or("-")
        );
    }

    let connection = ext.connection();
    println!(
        "connection: {}://{}:{} ({})",
        connection.driver,
        connection.host,
        connection.port.unwrap_or(3306),
        connection.dbname.as_deref().unwrap_or("-")
    );
    println!("proxies: {}", ext.manager().proxy_dir.display());

    Ok(())
}
