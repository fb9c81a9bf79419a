mod config;
mod connection;
mod inventory;
mod player;
mod world;

use std::io::Cursor;
use std::path::PathBuf;
use std::time::Duration;

use bonemeal_aura::{BonemealAura, TickOutcome};
use clap::Parser;
use mc_hooks::{PacketOutputEvent, PacketPipeline};
use mc_protocol::clientbound::Clientbound;
use mc_protocol::serverbound::{self, Serverbound};
use mc_protocol::{
    Decode, Encode, PROTOCOL_NAME, PROTOCOL_VERSION, Uuid, read_varint, write_varint,
};
use rand::Rng as _;
use tokio::net::TcpStream;
use tracing::{debug, info, warn};

use crate::config::BotConfig;
use crate::connection::Connection;
use crate::inventory::PLAYER_WINDOW;
use crate::player::Player;
use crate::world::BlockMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConnectionState {
    Handshaking,
    Login,
    Configuration,
    Play,
}

// Login packet IDs
const LOGIN_START: i32 = 0x00;
const LOGIN_ACKNOWLEDGED: i32 = 0x03;
const CB_LOGIN_DISCONNECT: i32 = 0x00;
const CB_LOGIN_SUCCESS: i32 = 0x02;
const CB_SET_COMPRESSION: i32 = 0x03;

// Configuration packet IDs
const CLIENT_INFORMATION: i32 = 0x00;
const CONFIG_CUSTOM_PAYLOAD: i32 = 0x02;
const FINISH_CONFIGURATION_ACK: i32 = 0x03;
const CONFIG_KEEP_ALIVE: i32 = 0x04;
const SELECT_KNOWN_PACKS: i32 = 0x07;
const CB_CONFIG_CUSTOM_PAYLOAD: i32 = 0x01;
const CB_CONFIG_DISCONNECT: i32 = 0x02;
const CB_FINISH_CONFIGURATION: i32 = 0x03;
const CB_CONFIG_KEEP_ALIVE: i32 = 0x04;
const CB_SELECT_KNOWN_PACKS: i32 = 0x0E;

// Play packets handled without a typed decoder
const CB_CHUNK_BATCH_FINISHED: i32 = 0x0B;
const CB_DISCONNECT: i32 = 0x20;
const CB_LOGIN: i32 = 0x30;

struct Bot {
    connection: Connection,
    state: ConnectionState,
    player_name: String,
    player_uuid: u128,
    config: BotConfig,
    world: BlockMap,
    player: Player,
    aura: BonemealAura,
    pipeline: PacketPipeline<Serverbound>,
}

impl Bot {
    fn new(
        stream: TcpStream,
        player_name: String,
        config: BotConfig,
        pipeline: PacketPipeline<Serverbound>,
    ) -> Self {
        let player_uuid = offline_uuid(&player_name);
        Self {
            connection: Connection::new(stream),
            state: ConnectionState::Handshaking,
            player_name,
            player_uuid,
            world: BlockMap::new(config.min_y, config.palette()),
            player: Player::new(config.bone_meal_item),
            aura: BonemealAura::new(config.aura),
            config,
            pipeline,
        }
    }

    async fn send_handshake(&mut self, host: &str, port: u16) -> eyre::Result<()> {
        let mut data = Vec::new();
        write_varint(&mut data, PROTOCOL_VERSION)?;
        host.encode(&mut data)?;
        port.encode(&mut data)?;
        write_varint(&mut data, 2)?; // Next state: Login

        self.connection.send_packet(0, &data).await?;
        self.state = ConnectionState::Login;
        info!("Sent Handshake ({} / protocol {})", PROTOCOL_NAME, PROTOCOL_VERSION);
        Ok(())
    }

    async fn send_login_start(&mut self) -> eyre::Result<()> {
        let mut data = Vec::new();
        self.player_name.encode(&mut data)?;
        Uuid(self.player_uuid).encode(&mut data)?;

        self.connection.send_packet(LOGIN_START, &data).await?;
        info!("Sent Login Start (name: {})", self.player_name);
        Ok(())
    }

    async fn send_client_information(&mut self) -> eyre::Result<()> {
        let mut data = Vec::new();
        "en_us".encode(&mut data)?;
        self.config.view_distance.encode(&mut data)?;
        write_varint(&mut data, 0)?; // Chat mode: enabled
        true.encode(&mut data)?; // Chat colors
        0x7Fu8.encode(&mut data)?; // All skin parts
        write_varint(&mut data, 1)?; // Main hand: right
        false.encode(&mut data)?; // Text filtering
        true.encode(&mut data)?; // Allow server listings
        write_varint(&mut data, 0)?; // Particles: all

        self.connection
            .send_packet(CLIENT_INFORMATION, &data)
            .await
    }

    async fn handle_login_packet(
        &mut self,
        packet_id: i32,
        cursor: &mut Cursor<&[u8]>,
    ) -> eyre::Result<bool> {
        match packet_id {
            CB_LOGIN_DISCONNECT => {
                let reason = String::decode(cursor)?;
                warn!("Disconnected during login: {}", reason);
                return Ok(false);
            }
            CB_LOGIN_SUCCESS => {
                let uuid = Uuid::decode(cursor)?;
                let name = String::decode(cursor)?;
                info!("Login Success: {} (uuid: {:032x})", name, uuid.0);
                self.connection.send_packet(LOGIN_ACKNOWLEDGED, &[]).await?;
                self.state = ConnectionState::Configuration;
                self.send_client_information().await?;
            }
            CB_SET_COMPRESSION => {
                let threshold = read_varint(cursor)?;
                info!("Set Compression threshold: {}", threshold);
                self.connection.set_compression(threshold);
            }
            _ => {
                debug!("Unknown login packet: 0x{:02X}", packet_id);
            }
        }
        Ok(true)
    }

    async fn handle_configuration_packet(
        &mut self,
        packet_id: i32,
        cursor: &mut Cursor<&[u8]>,
    ) -> eyre::Result<bool> {
        match packet_id {
            CB_CONFIG_CUSTOM_PAYLOAD => {
                let channel = String::decode(cursor)?;
                debug!("Custom Payload: channel={}", channel);
                if channel == "minecraft:brand" {
                    let mut data = Vec::new();
                    "minecraft:brand".encode(&mut data)?;
                    "bonemeal-bot".encode(&mut data)?;
                    self.connection
                        .send_packet(CONFIG_CUSTOM_PAYLOAD, &data)
                        .await?;
                }
            }
            CB_CONFIG_DISCONNECT => {
                warn!("Disconnected during configuration");
                return Ok(false);
            }
            CB_FINISH_CONFIGURATION => {
                info!("Got Finish Configuration");
                self.connection
                    .send_packet(FINISH_CONFIGURATION_ACK, &[])
                    .await?;
                self.state = ConnectionState::Play;
                info!("Transitioning to Play state");

                if self.config.enabled {
                    self.aura.enable();
                }
            }
            CB_CONFIG_KEEP_ALIVE => {
                let id = i64::decode(cursor)?;
                let mut data = Vec::new();
                id.encode(&mut data)?;
                self.connection
                    .send_packet(CONFIG_KEEP_ALIVE, &data)
                    .await?;
            }
            CB_SELECT_KNOWN_PACKS => {
                let count = read_varint(cursor)?;
                debug!("Known Packs: {} packs", count);
                let mut data = Vec::new();
                write_varint(&mut data, 0)?;
                self.connection
                    .send_packet(SELECT_KNOWN_PACKS, &data)
                    .await?;
            }
            _ => {
                debug!("Configuration packet: 0x{:02X}", packet_id);
            }
        }
        Ok(true)
    }

    async fn handle_play_packet(
        &mut self,
        packet_id: i32,
        cursor: &mut Cursor<&[u8]>,
    ) -> eyre::Result<bool> {
        match packet_id {
            CB_LOGIN => {
                let entity_id = i32::decode(cursor)?;
                info!("Play Login: entity_id={}", entity_id);
            }
            CB_DISCONNECT => {
                warn!("Disconnected by server");
                return Ok(false);
            }
            CB_CHUNK_BATCH_FINISHED => {
                self.player.queue(serverbound::ChunkBatchReceived {
                    chunks_per_tick: 20.0,
                });
            }
            _ => match Clientbound::decode(packet_id, cursor) {
                Ok(Some(packet)) => self.apply(packet),
                Ok(None) => {}
                Err(e) => debug!(packet_id, error = %e, "skipping malformed packet"),
            },
        }

        self.flush().await?;
        Ok(true)
    }

    /// Fold a clientbound packet into the world and player model.
    fn apply(&mut self, packet: Clientbound) {
        match packet {
            Clientbound::KeepAlive(keep_alive) => {
                self.player
                    .queue(serverbound::KeepAlive { id: keep_alive.id });
            }
            Clientbound::PlayerPosition(teleport) => {
                self.player.queue(serverbound::AcceptTeleportation {
                    teleport_id: teleport.teleport_id,
                });
                self.player.teleport(&teleport);
                info!(
                    "Teleported to ({:.2}, {:.2}, {:.2})",
                    self.player.position.x, self.player.position.y, self.player.position.z
                );
            }
            Clientbound::LevelChunkWithLight(chunk) => self.world.load_chunk(chunk),
            Clientbound::ForgetLevelChunk(chunk) => self.world.unload_chunk(chunk.x, chunk.z),
            Clientbound::BlockUpdate(update) => self.world.set_block(update.position, update.state),
            Clientbound::SectionBlocksUpdate(update) => {
                for change in update.changes {
                    self.world.set_block(change.position, change.state);
                }
            }
            Clientbound::ContainerSetContent(content) if content.window_id == PLAYER_WINDOW => {
                self.player
                    .inventory
                    .apply_contents(content.state_id, &content.slots, content.complete);
            }
            Clientbound::ContainerSetSlot(update) if update.window_id == PLAYER_WINDOW => {
                self.player
                    .inventory
                    .apply_slot(update.state_id, update.slot, update.item);
            }
            Clientbound::ContainerSetContent(_) | Clientbound::ContainerSetSlot(_) => {}
            Clientbound::SetHeldSlot(held) => {
                if let Ok(slot) = usize::try_from(held.slot) {
                    self.player.inventory.set_selected(slot);
                }
            }
            Clientbound::SetPlayerInventory(update) => {
                if let Ok(index) = usize::try_from(update.slot) {
                    self.player.inventory.set(index, update.item.stack());
                }
            }
        }
    }

    /// Send everything the player queued, through the outbound hook.
    async fn flush(&mut self) -> eyre::Result<()> {
        for packet in self.player.drain_outbox() {
            let Some(packet) = self.pipeline.intercept(packet) else {
                continue;
            };
            self.connection
                .send_packet(packet.id(), &packet.body()?)
                .await?;
        }
        Ok(())
    }

    async fn tick(&mut self) -> eyre::Result<()> {
        self.player.tick();

        // Nothing else drives the player, so it is never busy.
        match self.aura.on_update(&self.world, &mut self.player, &false) {
            TickOutcome::Used { interactions } => debug!(interactions, "used bone meal"),
            TickOutcome::SelectingItem => debug!("selecting bone meal"),
            _ => {}
        }

        self.flush().await
    }

    async fn run(&mut self, host: &str, port: u16) -> eyre::Result<()> {
        self.send_handshake(host, port).await?;
        self.send_login_start().await?;

        let mut tick_interval = tokio::time::interval(Duration::from_millis(50)); // 20 TPS
        let mut in_play = false;

        loop {
            tokio::select! {
                _ = tick_interval.tick(), if in_play => {
                    self.tick().await?;
                }
                result = self.connection.read_packet() => {
                    let Some((packet_id, data)) = result? else {
                        info!("Server closed the connection");
                        break;
                    };

                    let mut cursor = Cursor::new(data.as_slice());

                    let should_continue = match self.state {
                        ConnectionState::Login => self.handle_login_packet(packet_id, &mut cursor).await?,
                        ConnectionState::Configuration => self.handle_configuration_packet(packet_id, &mut cursor).await?,
                        ConnectionState::Play => {
                            if !in_play {
                                in_play = true;
                                info!("Bot is now in play mode, tending plants");
                            }
                            self.handle_play_packet(packet_id, &mut cursor).await?
                        }
                        ConnectionState::Handshaking => true,
                    };

                    if !should_continue {
                        break;
                    }
                }
            }
        }

        Ok(())
    }
}

fn offline_uuid(name: &str) -> u128 {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    let input = format!("OfflinePlayer:{}", name);
    let mut hasher = DefaultHasher::new();
    input.hash(&mut hasher);
    let hash1 = hasher.finish();
    input.hash(&mut hasher);
    let hash2 = hasher.finish();

    let uuid = ((hash1 as u128) << 64) | (hash2 as u128);
    // Version 3, RFC 4122 variant.
    let uuid = (uuid & !(0xF << 76)) | (0x3 << 76);
    (uuid & !(0x3 << 62)) | (0x2 << 62)
}

fn generate_bot_name() -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..6)
        .map(|_| {
            let c: u8 = rng.gen_range(0..36);
            if c < 10 {
                (b'0' + c) as char
            } else {
                (b'A' + c - 10) as char
            }
        })
        .collect();
    format!("Meal{}", suffix)
}

/// Outbound packet hook with the bot's own observers installed.
fn outbound_pipeline(config: &BotConfig) -> PacketPipeline<Serverbound> {
    let pipeline = PacketPipeline::new();

    pipeline.add_observer(|event: &mut PacketOutputEvent<Serverbound>| {
        let packet = event.packet();
        debug!(id = packet.id(), name = packet.name(), "outbound packet");
    });

    if !config.suppress_packets.is_empty() {
        let suppressed = config.suppress_packets.clone();
        pipeline.add_observer(move |event: &mut PacketOutputEvent<Serverbound>| {
            if suppressed.iter().any(|name| name == event.packet().name()) {
                event.cancel();
            }
        });
    }

    pipeline
}

/// Headless bot that bone meals the plants around it
#[derive(Parser, Debug)]
#[command(name = "mc-bot", version)]
struct Cli {
    /// Server host
    #[arg(default_value = "127.0.0.1")]
    host: String,

    /// Server port
    #[arg(default_value_t = 25565)]
    port: u16,

    /// Player name (random when omitted)
    name: Option<String>,

    /// Bot configuration file (TOML)
    #[arg(long, env = "BOT_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive("mc_bot=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let host = cli.host.as_str();
    let port = cli.port;
    let player_name = cli.name.unwrap_or_else(generate_bot_name);

    let config = match &cli.config {
        Some(path) => {
            info!("Loading config from {}", path.display());
            BotConfig::load(path)?
        }
        None => BotConfig::default(),
    };
    if config.bone_meal_item.is_none() {
        warn!("No bone_meal_item configured; the aura will never find bone meal");
    }
    if config.palette().is_empty() {
        warn!("No plants configured; the aura has nothing to target");
    }

    info!("MC Bot - Connecting to {}:{}", host, port);
    info!("Player: {}", player_name);

    let addr = format!("{}:{}", host, port);
    let stream = TcpStream::connect(&addr).await?;
    info!("Connected to {}", addr);

    let pipeline = outbound_pipeline(&config);
    let mut bot = Bot::new(stream, player_name, config, pipeline);
    bot.run(host, port).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use mc_protocol::serverbound::{Hand, Swing};

    use super::*;

    #[test]
    fn suppressed_packets_are_cancelled() {
        let config = BotConfig::parse(r#"suppress_packets = ["Swing"]"#).unwrap();
        let pipeline = outbound_pipeline(&config);

        let swing = Serverbound::from(Swing {
            hand: Hand::MainHand,
        });
        let keep_alive = Serverbound::from(serverbound::KeepAlive { id: 5 });

        assert_eq!(pipeline.intercept(swing), None);
        assert_eq!(
            pipeline.intercept(keep_alive.clone()),
            Some(keep_alive)
        );
    }

    #[test]
    fn cli_defaults() {
        let cli = Cli::try_parse_from(["mc-bot"]).unwrap();
        assert_eq!(cli.host, "127.0.0.1");
        assert_eq!(cli.port, 25565);
        assert_eq!(cli.name, None);
    }

    #[test]
    fn cli_positionals_and_config() {
        let cli = Cli::try_parse_from([
            "mc-bot",
            "--config",
            "bot.toml",
            "play.example.net",
            "25570",
            "Gardener",
        ])
        .unwrap();
        assert_eq!(cli.host, "play.example.net");
        assert_eq!(cli.port, 25570);
        assert_eq!(cli.name.as_deref(), Some("Gardener"));
        assert_eq!(cli.config, Some(PathBuf::from("bot.toml")));
    }

    #[test]
    fn cli_rejects_bad_port() {
        assert!(Cli::try_parse_from(["mc-bot", "localhost", "notaport"]).is_err());
    }

    #[test]
    fn offline_uuid_is_version_3() {
        let uuid = offline_uuid("Steve");
        assert_eq!((uuid >> 76) & 0xF, 3);
        assert_eq!((uuid >> 62) & 0x3, 2);
        assert_eq!(uuid, offline_uuid("Steve"));
    }
}
