//! Manual smoke client: connects over WebSocket, creates a room, drives a
//! short game exchange, and prints everything the server sends back.

use futures_util::{SinkExt, StreamExt};
use serde_json::json;
use shared::{ClientEvent, ServerEvent};
use tokio::time::{sleep, Duration};
use tokio_tungstenite::{connect_async, tungstenite::Message};

fn frame(event: &ClientEvent) -> Result<Message, serde_json::Error> {
    Ok(Message::Text(serde_json::to_string(event)?))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "ws://127.0.0.1:3000/ws".to_string());

    println!("Connecting to {}", url);
    let (socket, _) = connect_async(url.as_str()).await?;
    let (mut sink, mut stream) = socket.split();

    println!("Sending create-room");
    sink.send(frame(&ClientEvent::CreateRoom)?).await?;

    let code = loop {
        match stream.next().await {
            Some(Ok(Message::Text(text))) => {
                match serde_json::from_str::<ServerEvent>(&text) {
                    Ok(ServerEvent::CreatedRoom(code)) => {
                        println!("Room created with code {}", code);
                        break code;
                    }
                    Ok(other) => println!("Unexpected event: {:?}", other),
                    Err(err) => println!("Failed to parse frame: {}", err),
                }
            }
            Some(Ok(_)) => {}
            other => {
                println!("Connection ended before created-room: {:?}", other);
                return Ok(());
            }
        }
    };

    println!("Starting game in room {}", code);
    sink.send(frame(&ClientEvent::StartGame(json!({"round": 1})))?)
        .await?;

    for strikes in 1..=3 {
        sink.send(frame(&ClientEvent::ShowStrikes(strikes))?).await?;
        sleep(Duration::from_millis(200)).await;
    }

    // Everything above echoes back to us as the room's only member.
    for _ in 0..4 {
        if let Some(Ok(Message::Text(text))) = stream.next().await {
            match serde_json::from_str::<ServerEvent>(&text) {
                Ok(event) => println!("Received: {:?}", event),
                Err(err) => println!("Failed to parse frame: {}", err),
            }
        }
    }

    println!("Leaving room");
    sink.send(frame(&ClientEvent::LeaveRoom(false))?).await?;
    sink.send(Message::Close(None)).await?;

    println!("Test client finished");
    Ok(())
}
