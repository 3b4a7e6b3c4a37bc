//! Gateway - TCP listener that accepts incoming connections.
//!
//! The Gateway binds to a socket and spawns a Connection task for each
//! incoming client. When the configured address is IPv6 the socket is set
//! up dual-stack so v4-mapped clients can connect too.

use std::net::SocketAddr;
use std::sync::Arc;

use socket2::{Domain, Protocol, Socket, Type};
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::handlers::Dispatcher;
use crate::network::Connection;
use crate::state::Registry;

pub struct Gateway {
    listener: TcpListener,
    registry: Arc<Registry>,
    dispatcher: Arc<Dispatcher>,
}

impl Gateway {
    /// Bind the gateway to the specified address.
    pub async fn bind(
        addr: SocketAddr,
        registry: Arc<Registry>,
        dispatcher: Arc<Dispatcher>,
    ) -> std::io::Result<Self> {
        let listener = make_listener(addr)?;
        info!(%addr, "gateway listening");
        Ok(Self {
            listener,
            registry,
            dispatcher,
        })
    }

    /// The bound address (useful when binding port 0).
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept connections until the shutdown signal fires.
    pub async fn run(self) -> std::io::Result<()> {
        let mut shutdown_rx = self.registry.shutdown_tx.subscribe();

        loop {
            tokio::select! {
                accepted = self.listener.accept() => match accepted {
                    Ok((stream, addr)) => {
                        let registry = Arc::clone(&self.registry);
                        let dispatcher = Arc::clone(&self.dispatcher);
                        let id = registry.next_session_id();
                        info!(%id, %addr, "connection accepted");

                        tokio::spawn(async move {
                            let connection =
                                Connection::new(id, stream, addr, registry, dispatcher);
                            if let Err(e) = connection.run().await {
                                error!(%id, %addr, error = %e, "connection error");
                            }
                            info!(%id, %addr, "connection closed");
                        });
                    }
                    Err(e) => {
                        error!(error = %e, "failed to accept connection");
                    }
                },
                _ = shutdown_rx.recv() => {
                    info!("gateway stopping");
                    break;
                }
            }
        }

        Ok(())
    }
}

fn make_listener(addr: SocketAddr) -> std::io::Result<TcpListener> {
    let domain = if addr.is_ipv6() {
        Domain::IPV6
    } else {
        Domain::IPV4
    };
    let socket = Socket::new(domain, Type::STREAM, Some(Protocol::TCP))?;
    if addr.is_ipv6() {
        // Dual-stack: accept v4-mapped peers. Not fatal if the OS refuses.
        let _ = socket.set_only_v6(false);
    }
    socket.set_reuse_address(true)?;
    socket.set_nonblocking(true)?;
    socket.bind(&addr.into())?;
    socket.listen(1024)?;
    TcpListener::from_std(socket.into())
}
