//! Integration tests: a simulated device on a loopback UDP socket sends
//! acknowledgements to a client socket that waits for them.

use std::net::{SocketAddr, UdpSocket};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use lanlight_ack::{
    wait_for_acks, wait_for_acks_with, AckWaitCause, Cancelled, WaitConfig, WaitContext,
};
use lanlight_protocol::{Header, MessageKind};
use socket2::{Domain, Protocol, Socket, Type};

const SOURCE: u32 = 0x4C41_4E4C;
const DEVICE_TARGET: u64 = 0x0000_D073_D5AA_BBCC;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lanlight_ack=trace".into()),
        )
        .with_test_writer()
        .try_init();
}

fn test_config() -> WaitConfig {
    WaitConfig::default().with_read_timeout(Duration::from_millis(20))
}

/// Device socket plus a client socket connected to it.
fn pair() -> anyhow::Result<(UdpSocket, UdpSocket)> {
    let device = UdpSocket::bind("127.0.0.1:0")?;
    let client = UdpSocket::bind("127.0.0.1:0")?;
    client.connect(device.local_addr()?)?;
    Ok((device, client))
}

fn send_ack(device: &UdpSocket, to: SocketAddr, source: u32, sequence: u8) -> anyhow::Result<()> {
    let bytes = Header::ack(source, DEVICE_TARGET, sequence).encode(&[]);
    device.send_to(&bytes, to)?;
    Ok(())
}

#[test]
fn loopback_acks_out_of_order() -> anyhow::Result<()> {
    init_tracing();
    let (device, client) = pair()?;
    let client_addr = client.local_addr()?;

    send_ack(&device, client_addr, SOURCE, 2)?;
    send_ack(&device, client_addr, 99, 1)?; // someone else's conversation
    send_ack(&device, client_addr, SOURCE, 1)?;
    send_ack(&device, client_addr, SOURCE, 3)?;

    let ctx = WaitContext::with_timeout(Duration::from_secs(5));
    wait_for_acks_with(&test_config(), &ctx, &client, SOURCE, &[1, 2, 3])?;
    Ok(())
}

#[test]
fn loopback_acks_from_device_thread() -> anyhow::Result<()> {
    init_tracing();
    let (device, client) = pair()?;
    let client_addr = client.local_addr()?;
    let (start_tx, start_rx) = crossbeam_channel::bounded::<()>(1);

    let device_handle = thread::spawn(move || -> anyhow::Result<()> {
        start_rx.recv()?;
        for seq in [10u8, 11, 11, 12] {
            thread::sleep(Duration::from_millis(30));
            send_ack(&device, client_addr, SOURCE, seq)?;
        }
        Ok(())
    });

    start_tx.send(())?;
    let ctx = WaitContext::with_timeout(Duration::from_secs(5));
    wait_for_acks_with(&test_config(), &ctx, &client, SOURCE, &[10, 11, 12])?;

    device_handle.join().expect("device thread panicked")?;
    Ok(())
}

#[test]
fn loopback_deadline_reports_partial_progress() -> anyhow::Result<()> {
    init_tracing();
    let (device, client) = pair()?;
    let client_addr = client.local_addr()?;

    send_ack(&device, client_addr, SOURCE, 1)?;
    let state = Header {
        kind: MessageKind::StateService,
        ..Header::ack(SOURCE, DEVICE_TARGET, 2)
    };
    device.send_to(&state.encode(&[1, 0x7C, 0xDD, 0, 0]), client_addr)?;

    let ctx = WaitContext::with_timeout(Duration::from_millis(200));
    let start = Instant::now();
    let err = wait_for_acks_with(&test_config(), &ctx, &client, SOURCE, &[1, 2]).unwrap_err();

    assert_eq!(err.received, 1);
    assert_eq!(err.total, 2);
    assert!(matches!(
        err.cause,
        AckWaitCause::Cancelled(Cancelled::DeadlineExceeded)
    ));
    assert!(err.to_string().contains("1 of 2 ack(s) received"));
    assert!(start.elapsed() < Duration::from_secs(2));
    Ok(())
}

#[test]
fn loopback_cancel_from_another_thread() -> anyhow::Result<()> {
    init_tracing();
    let (device, client) = pair()?;
    let client_addr = client.local_addr()?;
    let ctx = WaitContext::new();
    let (sent_tx, sent_rx) = crossbeam_channel::bounded::<()>(1);

    let canceller = {
        let ctx = ctx.clone();
        thread::spawn(move || {
            if sent_rx.recv_timeout(Duration::from_secs(5)).is_ok() {
                thread::sleep(Duration::from_millis(50));
            }
            ctx.cancel();
        })
    };

    send_ack(&device, client_addr, SOURCE, 7)?;
    sent_tx.send(())?;

    let start = Instant::now();
    let err = wait_for_acks_with(&test_config(), &ctx, &client, SOURCE, &[7, 8, 9]).unwrap_err();
    canceller.join().expect("canceller panicked");

    assert_eq!(err.received, 1);
    assert_eq!(err.total, 3);
    assert!(matches!(err.cause, AckWaitCause::Cancelled(Cancelled::Cancelled)));
    // cancellation is seen within a read timeout of being requested
    assert!(start.elapsed() < Duration::from_secs(1));
    Ok(())
}

#[test]
fn loopback_malformed_datagram_is_fatal() -> anyhow::Result<()> {
    init_tracing();
    let (device, client) = pair()?;
    let client_addr = client.local_addr()?;

    device.send_to(b"not a header", client_addr)?;
    send_ack(&device, client_addr, SOURCE, 1)?;

    let ctx = WaitContext::with_timeout(Duration::from_secs(5));
    let err = wait_for_acks_with(&test_config(), &ctx, &client, SOURCE, &[1]).unwrap_err();
    assert_eq!(err.received, 0);
    assert!(matches!(err.cause, AckWaitCause::Decode(_)));
    Ok(())
}

#[test]
fn socket2_socket_as_conn() -> anyhow::Result<()> {
    init_tracing();
    let device = UdpSocket::bind("127.0.0.1:0")?;
    let device_addr = device.local_addr()?;

    let socket = Socket::new(Domain::IPV4, Type::DGRAM, Some(Protocol::UDP))?;
    socket.set_recv_buffer_size(256 * 1024)?;
    let bind_addr: SocketAddr = "127.0.0.1:0".parse()?;
    socket.bind(&bind_addr.into())?;
    socket.connect(&device_addr.into())?;
    let client_addr = socket
        .local_addr()?
        .as_socket()
        .ok_or_else(|| anyhow::anyhow!("client socket has no inet address"))?;
    let client = Arc::new(socket);

    send_ack(&device, client_addr, SOURCE, 200)?;
    send_ack(&device, client_addr, SOURCE, 201)?;

    let ctx = WaitContext::with_timeout(Duration::from_secs(5));
    wait_for_acks_with(&test_config(), &ctx, &client, SOURCE, &[200, 201])?;
    Ok(())
}

#[test]
fn process_wide_config_waits() -> anyhow::Result<()> {
    init_tracing();
    let (device, client) = pair()?;
    let client_addr = client.local_addr()?;

    let ctx = WaitContext::with_timeout(Duration::from_secs(5));
    wait_for_acks(&ctx, &client, SOURCE, &[])?;

    send_ack(&device, client_addr, SOURCE, 0)?;
    wait_for_acks(&ctx, &client, SOURCE, &[0])?;
    Ok(())
}
