//! Fingerprint control-path diagnostic tool
//!
//! Wires the driver core to simulated hardware and walks the whole
//! control surface: open, listener registration, IRQ arming, finger
//! edges, key injection, reset pulse, close. The printed trace shows
//! every hardware-facing call the core makes.

mod sim;

use std::sync::Arc;

use clap::Parser;

use fp_driver::config::StaticLineConfig;
use fp_driver::constants::{IRQ_LINE_NAME, RESET_LINE_NAME};
use fp_driver::device::display::{BlankState, DisplayEvent, DisplayPhase};
use fp_driver::klog;
use fp_driver::sensor::{ControlRequest, DeviceDeps, FpDriver, FpKey, KeyEvent};

use sim::{
    SimBoard, SimBridge, SimDisplay, SimInputSink, SimIrqController, SimTransport,
    SimWakeSource, SimWorkQueue,
};

const RESET_LINE: u32 = 14;
const IRQ_LINE: u32 = 15;
const DEV_ID: u32 = 0;
const LISTENER: u32 = 4242;

#[derive(Parser)]
#[command(about = "Exercise the fingerprint sensor control path on simulated hardware")]
struct Args {
    /// Number of finger edges to simulate
    #[arg(short, long, default_value_t = 2)]
    edges: u32,

    /// Key to inject after the edges (home, power, camera)
    #[arg(short, long, default_value = "home")]
    key: String,

    /// Dump the driver log at the end of the run
    #[arg(long)]
    log: bool,
}

fn parse_key(name: &str) -> Result<FpKey, String> {
    match name {
        "home" => Ok(FpKey::Home),
        "power" => Ok(FpKey::Power),
        "camera" => Ok(FpKey::Camera),
        other => Err(format!("unknown key '{other}' (expected home, power, camera)")),
    }
}

fn main() -> Result<(), String> {
    let args = Args::parse();
    let key = parse_key(&args.key)?;

    let board = SimBoard::new();
    let irq = SimIrqController::new();
    let display = SimDisplay::new();
    let queue = SimWorkQueue::new();

    let driver = FpDriver::load(Some(SimTransport::new()))
        .map_err(|e| format!("driver load failed: {e}"))?;

    println!("probe:");
    let device = driver
        .probe(
            DEV_ID,
            DeviceDeps {
                config: Arc::new(StaticLineConfig::new(&[
                    (RESET_LINE_NAME, RESET_LINE),
                    (IRQ_LINE_NAME, IRQ_LINE),
                ])),
                gpio: board.clone(),
                irq: irq.clone(),
                input: SimInputSink::new(),
                display: display.clone(),
                bridge: SimBridge::new(),
                wake: SimWakeSource::new(),
                delay: board.clone(),
                work_queue: queue.clone(),
            },
        )
        .map_err(|e| format!("probe failed: {e}"))?;

    println!("open:");
    driver.open(DEV_ID).map_err(|e| format!("open failed: {e}"))?;

    println!("listener hello:");
    driver.handle_listener_message(LISTENER);

    let mut route = [0u8; 1];
    device
        .control(ControlRequest::Init { route_out: &mut route })
        .map_err(|e| format!("init failed: {e}"))?;
    println!("  control: transport route {}", route[0]);

    println!("arm:");
    device
        .control(ControlRequest::EnableIrq)
        .map_err(|e| format!("enable-irq failed: {e}"))?;
    device
        .control(ControlRequest::HalReady)
        .map_err(|e| format!("hal-ready failed: {e}"))?;

    println!("panel off:");
    display.emit(DisplayEvent {
        phase: DisplayPhase::Blank,
        state: Some(BlankState::PowerDown),
    });
    println!(
        "  device: panel_off={} awaiting_finger={}",
        device.panel_off(),
        device.awaiting_finger()
    );

    let irq_number = IRQ_LINE + SimIrqController::IRQ_BASE;
    for edge in 1..=args.edges {
        println!("finger edge {edge}:");
        irq.fire(irq_number);
    }
    queue.run_pending();

    println!("inject {}:", args.key);
    let payload = KeyEvent::new(key, 1).to_bytes();
    device
        .control(ControlRequest::InputKey { payload: &payload })
        .map_err(|e| format!("key injection failed: {e}"))?;

    println!("reset pulse:");
    device
        .control(ControlRequest::Reset)
        .map_err(|e| format!("reset failed: {e}"))?;

    println!("panel on:");
    display.emit(DisplayEvent {
        phase: DisplayPhase::Blank,
        state: Some(BlankState::Unblank),
    });

    println!("close:");
    device.close().map_err(|e| format!("close failed: {e}"))?;
    println!(
        "  device: users={} available={}",
        device.users(),
        device.is_available()
    );

    driver.remove(DEV_ID).map_err(|e| format!("remove failed: {e}"))?;

    if args.log {
        println!("driver log:");
        for entry in klog::KLOG.drain() {
            println!("  {}", entry.format());
        }
    }

    Ok(())
}
