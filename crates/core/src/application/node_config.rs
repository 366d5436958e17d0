// L1 node configuration file
// Static template: network parameters, RPC credentials and the seed node

use std::path::{Path, PathBuf};
use tracing::info;

use super::constants::{NODE_RPC_PASSWORD, NODE_RPC_PORT, NODE_RPC_USER, NODE_ZMQ_PORT};
use crate::error::Result;

pub const NODE_CONFIG_FILENAME: &str = "bitcoin.conf";

const SIGNET_CHALLENGE: &str = "00141f61d57873d70d28bd28b3c9f9d6bf818b5a0d6a";
const SEED_NODE: &str = "172.105.148.135:38333";

/// Render the node configuration
pub fn render() -> String {
    format!(
        "rpcuser={user}\n\
         rpcpassword={password}\n\
         server=1\n\
         listen=1\n\
         txindex=1\n\
         zmqpubsequence=tcp://127.0.0.1:{zmq}\n\
         rpcthreads=20\n\
         rpcworkqueue=100\n\
         rest=1\n\
         fallbackfee=0.00021\n\
         signet=1\n\
         signetblocktime=60\n\
         signetchallenge={challenge}\n\
         acceptnonstdtxn=1\n\
         \n\
         [signet]\n\
         addnode={seed}\n\
         rpcport={rpc_port}\n",
        user = NODE_RPC_USER,
        password = NODE_RPC_PASSWORD,
        zmq = NODE_ZMQ_PORT,
        challenge = SIGNET_CHALLENGE,
        seed = SEED_NODE,
        rpc_port = NODE_RPC_PORT,
    )
}

/// Write `bitcoin.conf` into `dir`, replacing any previous version
pub async fn write_node_config(dir: &Path) -> Result<PathBuf> {
    tokio::fs::create_dir_all(dir).await?;
    let path = dir.join(NODE_CONFIG_FILENAME);
    tokio::fs::write(&path, render()).await?;

    info!(path = %path.display(), "Wrote node configuration");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_contains_rpc_settings() {
        let conf = render();
        assert!(conf.contains("rpcuser=user\n"));
        assert!(conf.contains("rpcpassword=password\n"));
        assert!(conf.contains("signet=1\n"));
        assert!(conf.contains("rpcport=38332\n"));
        assert!(conf.contains("addnode=172.105.148.135:38333"));
    }

    #[tokio::test]
    async fn test_write_overwrites_existing() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("Bitcoin");
        std::fs::create_dir_all(&target).unwrap();
        std::fs::write(target.join(NODE_CONFIG_FILENAME), "rpcuser=someone-else\n").unwrap();

        let path = write_node_config(&target).await.unwrap();

        let written = std::fs::read_to_string(path).unwrap();
        assert_eq!(written, render());
    }
}
