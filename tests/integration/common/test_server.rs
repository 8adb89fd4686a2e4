use axum::Router;
use scholar::agents::config::{AgentConfig, LlmProviderConfig, NotesConfig, StoreConfig};
use scholar::agents::llm::ScriptedProvider;
use scholar::config::{ServerSettings, Settings};
use std::net::SocketAddr;
use std::sync::Arc;

pub struct TestServer {
    pub addr: SocketAddr,
    pub base_url: String,
    pub llm: Arc<ScriptedProvider>,
}

impl TestServer {
    pub async fn new() -> Self {
        // Create test configuration
        let settings = Settings {
            server: ServerSettings {
                host: "127.0.0.1".to_string(),
                port: 0, // Random port
                cors_origins: vec!["*".to_string()],
            },
            llm: LlmProviderConfig::default(),
            agent: AgentConfig::default(),
            store: StoreConfig::default(),
            notes: NotesConfig::default(),
        };

        let llm = Arc::new(ScriptedProvider::new());
        let (state, health_handler) = scholar::build_state(&settings, llm.clone()).unwrap();

        // Create app
        let app = scholar::create_app(state, health_handler, &settings.server.cors_origins);
        let (addr, base_url) = serve(app).await;

        TestServer {
            addr,
            base_url,
            llm,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Serve `app` on a random local port
pub async fn serve(app: Router) -> (SocketAddr, String) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let base_url = format!("http://{}", addr);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    // Wait for server to be ready
    tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

    (addr, base_url)
}
