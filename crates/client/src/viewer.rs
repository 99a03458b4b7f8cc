//! Headless viewer: joins a server, steers its cell around and plays back
//! the received snapshots through an [`InterpolationBuffer`].

use crate::config::InterpolationConfig;
use crate::interpolation::InterpolationBuffer;
use futures_util::{SinkExt, StreamExt};
use glam::Vec2;
use protocol::{ClientMessage, Point, ServerMessage};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;
use tokio::time::{interval, Instant, MissedTickBehavior};
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, info, warn};

/// Distance from the camera at which the wandering target is placed.
const WANDER_REACH: f32 = 400.0;
/// Largest heading change between two target updates, in radians.
const WANDER_TURN: f32 = 0.3;

/// A heading that drifts a little every time it is sampled.
#[derive(Debug)]
struct Wander {
    heading: f32,
    rng: StdRng,
}

impl Wander {
    fn new(mut rng: StdRng) -> Self {
        let heading = rng.random_range(0.0..std::f32::consts::TAU);
        Self { heading, rng }
    }

    fn next_target(&mut self, around: Vec2) -> Vec2 {
        self.heading += self.rng.random_range(-WANDER_TURN..=WANDER_TURN);
        around + Vec2::from_angle(self.heading) * WANDER_REACH
    }
}

/// Milliseconds elapsed on a monotonic clock.
#[inline]
fn now_ms(clock: Instant) -> f64 {
    clock.elapsed().as_secs_f64() * 1000.0
}

/// Connect to `config.server_url` and run until the server closes the connection.
pub async fn run(config: InterpolationConfig) -> anyhow::Result<()> {
    let (ws_stream, _) = connect_async(config.server_url.as_str()).await?;
    info!("Connected to {}", config.server_url);

    let (mut write, mut read) = ws_stream.split();
    write
        .send(Message::Text(ClientMessage::JoinGameRequest.encode()?.into()))
        .await?;

    let clock = Instant::now();
    let mut buffer = InterpolationBuffer::new(&config);
    let mut wander = Wander::new(StdRng::from_os_rng());
    let mut player_id: Option<u32> = None;

    let draw_rate = config.draw_rate.max(1);
    let mut draw = interval(Duration::from_secs_f64(1.0 / draw_rate as f64));
    draw.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut steer = interval(Duration::from_secs_f64(config.tick_period_ms.max(1.0) / 1000.0));
    steer.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut frames: u64 = 0;

    loop {
        tokio::select! {
            msg = read.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => match ServerMessage::decode(text.as_str()) {
                        Ok(ServerMessage::JoinGameResponse(response)) => {
                            if response.join_successful {
                                info!("Joined as player {:?}", response.player_id);
                                player_id = response.player_id;
                            } else {
                                warn!("Join refused, spectating");
                            }
                        }
                        Ok(ServerMessage::GameUpdate(update)) => {
                            buffer.push(update, now_ms(clock));
                        }
                        Err(e) => warn!("Bad message from server: {}", e),
                    },
                    Some(Ok(Message::Close(_))) | None => {
                        info!("Server closed the connection");
                        break;
                    }
                    Some(Err(e)) => return Err(e.into()),
                    _ => {}
                }
            }
            _ = draw.tick() => {
                let now = now_ms(clock);
                buffer.update(now);
                if let Some(frame) = buffer.current() {
                    frames += 1;
                    if frames % draw_rate as u64 == 0 {
                        debug!(
                            "Frame {}: camera ({:.0}, {:.0}) width {:.0}, {} cells, {} food, progress {:.2}, {} buffered",
                            frames,
                            frame.camera.position.x,
                            frame.camera.position.y,
                            frame.camera.view_area_width,
                            frame.cells.len(),
                            frame.food.len(),
                            buffer.progress(),
                            buffer.len()
                        );
                    }
                }
            }
            _ = steer.tick(), if player_id.is_some() => {
                if let Some(frame) = buffer.current() {
                    let target = wander.next_target(frame.camera.position);
                    let message = ClientMessage::TargetPositionUpdate {
                        position: Point::from(target),
                    };
                    write.send(Message::Text(message.encode()?.into())).await?;
                }
            }
        }
    }

    Ok(())
}
