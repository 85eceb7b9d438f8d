use anyhow::Result;
use safety_quiz::utils::logging;
use safety_quiz::{App, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // 加载配置
    let config = Config::from_env();

    // 初始化日志
    logging::init(config.verbose_logging);

    // 初始化并运行应用
    let _result = App::initialize(config).await?.run().await?;

    Ok(())
}
