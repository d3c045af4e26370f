use anyhow::Context;
use treuss::{
    configuration::get_configuration,
    startup::Application,
    telemetry::{get_subscriber, init_subscriber},
};

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let subscriber = get_subscriber("treuss", "info", std::io::stdout);
    init_subscriber(subscriber);

    let config = get_configuration().context("Failed to read configuration")?;

    let app = Application::build(config)
        .await
        .context("Failed to build the application")?;
    app.run_until_stopped()
        .await
        .context("The server terminated with an error")?;

    Ok(())
}
