use std::process::ExitCode;

use revigo_batch_submit::orchestrator::App;
use revigo_batch_submit::{logger, Config};
use tracing::error;

#[tokio::main]
async fn main() -> ExitCode {
    // 初始化日志
    logger::init();

    // 加载配置
    let config = Config::from_env();

    // 初始化并运行应用
    let app = match App::initialize(config) {
        Ok(app) => app,
        Err(e) => {
            error!("❌ 初始化失败: {:#}", e);
            return ExitCode::from(2);
        }
    };

    match app.run().await {
        Ok(outcome) => outcome.exit_code(),
        Err(e) => {
            error!("❌ 运行失败: {:#}", e);
            ExitCode::from(2)
        }
    }
}
