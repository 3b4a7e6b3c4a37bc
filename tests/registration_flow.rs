//! Integration tests for registration, nickname collisions, and the
//! dispatcher's state gate.

mod common;

use common::{HOST, TestClient, TestServer};

#[tokio::test]
async fn welcome_triplet_is_byte_exact() -> anyhow::Result<()> {
    let server = TestServer::spawn(17661).await?;

    let mut alice = TestClient::connect(&server.address()).await?;
    alice.send_line("NICK alice").await?;
    alice.send_line("USER alice 0 * :Alice").await?;

    alice
        .expect(&format!(":{} 001 alice :Welcome to the IRC server!", HOST))
        .await?;
    alice
        .expect(&format!(":{} 002 alice :Your host is {}", HOST, HOST))
        .await?;
    alice.expect(&format!(":{} 004 alice {}", HOST, HOST)).await?;
    Ok(())
}

#[tokio::test]
async fn nick_collision_is_resolved_with_a_suffix() -> anyhow::Result<()> {
    let server = TestServer::spawn(17662).await?;

    let mut alice = TestClient::connect(&server.address()).await?;
    alice.register("alice").await?;

    let mut bob = TestClient::connect(&server.address()).await?;
    bob.send_line("NICK alice").await?;

    let notice = bob.recv_line().await?;
    let prefix = format!(":{} NOTICE ", HOST);
    assert!(notice.starts_with(&prefix), "unexpected line: {:?}", notice);

    let rest = &notice[prefix.len()..];
    let actual = rest.split(' ').next().unwrap();
    assert_eq!(
        notice,
        format!(
            ":{} NOTICE {} :Nickname alice is already in use, you are now known as {}\r\n",
            HOST, actual, actual
        )
    );

    let suffix: u32 = actual.strip_prefix("alice").unwrap().parse()?;
    assert!((1000..=9999).contains(&suffix), "suffix {} out of range", suffix);

    // Registration completes under the suffixed nick.
    bob.send_line("USER bob 0 * :Bob").await?;
    bob.expect(&format!(":{} 001 {} :Welcome to the IRC server!", HOST, actual))
        .await?;
    Ok(())
}

#[tokio::test]
async fn user_before_nick_is_431() -> anyhow::Result<()> {
    let server = TestServer::spawn(17663).await?;

    let mut client = TestClient::connect(&server.address()).await?;
    client.send_line("USER alice 0 * :Alice").await?;
    client.expect(&format!(":{} 431 * :No nickname given", HOST)).await?;
    Ok(())
}

#[tokio::test]
async fn commands_before_registration_are_451() -> anyhow::Result<()> {
    let server = TestServer::spawn(17664).await?;

    let mut client = TestClient::connect(&server.address()).await?;
    client.send_line("NICK carol").await?;
    client.send_line("JOIN #room").await?;
    client
        .expect(&format!(":{} 451 carol :You have not registered", HOST))
        .await?;
    Ok(())
}

#[tokio::test]
async fn quit_works_before_registration() -> anyhow::Result<()> {
    let server = TestServer::spawn(17670).await?;

    let mut client = TestClient::connect(&server.address()).await?;
    client.send_line("QUIT").await?;

    // The quit is processed, not answered with 451: the server closes the
    // connection without sending anything.
    assert!(
        client.recv_line().await.is_err(),
        "connection should be closed after QUIT"
    );
    Ok(())
}

#[tokio::test]
async fn bot_auth_works_before_registration() -> anyhow::Result<()> {
    let server = TestServer::spawn(17660).await?;

    // NICK alone leaves the session unregistered; BOT_AUTH still goes
    // through rather than drawing a 451.
    let mut client = TestClient::connect(&server.address()).await?;
    client.send_line("NICK helper").await?;
    client.send_line("BOT_AUTH testsecret").await?;
    client
        .expect(&format!(":{} 900 helper :BOT_AUTH_SUCCESS helper", HOST))
        .await?;
    Ok(())
}

#[tokio::test]
async fn unknown_commands_are_421() -> anyhow::Result<()> {
    let server = TestServer::spawn(17665).await?;

    let mut alice = TestClient::connect(&server.address()).await?;
    alice.register("alice").await?;

    alice.send_line("WHOIS alice").await?;
    alice
        .expect(&format!(":{} 421 alice WHOIS :Unknown command", HOST))
        .await?;
    Ok(())
}

#[tokio::test]
async fn missing_parameters_are_461() -> anyhow::Result<()> {
    let server = TestServer::spawn(17666).await?;

    let mut alice = TestClient::connect(&server.address()).await?;
    alice.register("alice").await?;

    alice.send_line("JOIN").await?;
    alice
        .expect(&format!(":{} 461 alice JOIN :Not enough parameters", HOST))
        .await?;

    alice.send_line("PRIVMSG #room").await?;
    alice
        .expect(&format!(":{} 461 alice PRIVMSG :Not enough parameters", HOST))
        .await?;
    Ok(())
}

#[tokio::test]
async fn bare_nick_is_431() -> anyhow::Result<()> {
    let server = TestServer::spawn(17667).await?;

    let mut client = TestClient::connect(&server.address()).await?;
    client.send_line("NICK").await?;
    client.expect(&format!(":{} 431 * :No nickname given", HOST)).await?;
    Ok(())
}

#[tokio::test]
async fn nick_change_is_announced_to_room_peers() -> anyhow::Result<()> {
    let server = TestServer::spawn(17668).await?;

    let mut alice = TestClient::connect(&server.address()).await?;
    alice.register("alice").await?;
    let mut bob = TestClient::connect(&server.address()).await?;
    bob.register("bob").await?;

    alice.join("alice", "#room", &["alice"]).await?;
    bob.join("bob", "#room", &["alice", "bob"]).await?;
    alice.expect(":bob JOIN #room").await?;

    alice.send_line("NICK alicia").await?;
    alice.expect(":alice NICK :alicia").await?;
    bob.expect(":alice NICK :alicia").await?;
    Ok(())
}

#[tokio::test]
async fn quit_closes_the_connection_and_informs_peers() -> anyhow::Result<()> {
    let server = TestServer::spawn(17669).await?;

    let mut alice = TestClient::connect(&server.address()).await?;
    alice.register("alice").await?;
    let mut bob = TestClient::connect(&server.address()).await?;
    bob.register("bob").await?;

    alice.join("alice", "#room", &["alice"]).await?;
    bob.join("bob", "#room", &["alice", "bob"]).await?;
    alice.expect(":bob JOIN #room").await?;

    alice.send_line("QUIT").await?;
    bob.expect(":alice QUIT :Client Quit").await?;
    assert!(alice.recv_line().await.is_err(), "alice should be disconnected");
    Ok(())
}
