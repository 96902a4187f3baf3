use std::sync::Arc;

mod config;
mod handler;
mod http;
mod logger;
mod routing;
mod server;
mod storage;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = config::Config::load()?;
    logger::init(&cfg)?;

    // 创建 Tokio 运行时，根据 workers 配置设置线程数
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: config::Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;

    if let Err(e) = tokio::fs::create_dir_all(&cfg.storage.base_dir).await {
        logger::log_warning(&format!(
            "Could not create base directory {}: {e}",
            cfg.storage.base_dir.display()
        ));
    }

    let listener = server::create_listener(addr, cfg.server.backlog)?;
    logger::log_server_start(&addr, &cfg);

    let state = Arc::new(config::AppState::new(cfg));
    let signals = Arc::new(server::SignalHandler::new());
    server::start_signal_handler(Arc::clone(&signals));

    server::run_server(listener, state, signals).await;
    Ok(())
}
