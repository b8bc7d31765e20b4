//! Drive a few virtual devices through a short simulated run.
//!
//! ```text
//! RUST_LOG=debug cargo run --example manager_loop
//! ```

use devrig::backends::virtual_input::VirtualDevice;
use devrig::DeviceManager;
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let stick = Rc::new(RefCell::new(VirtualDevice::new("stick")));
    let pedals = Rc::new(RefCell::new(VirtualDevice::new("pedals")));
    let pad = Rc::new(RefCell::new(VirtualDevice::new("pad")));

    let mut mgr = DeviceManager::new();
    mgr.register(stick.clone());
    mgr.register(pedals.clone());
    mgr.register_rumble(pad.clone());

    mgr.open_all().expect("open devices");
    let period = mgr.schedule().period().expect("valid period");

    // Pedals drop out for a few cycles; updates keep going for everyone else.
    for tick in 0..10u16 {
        stick.borrow_mut().set_axis(0, f32::from(tick) / 10.0);
        if tick == 3 {
            pedals.borrow_mut().fail_update("USB read timed out");
        }
        if tick == 6 {
            pedals.borrow_mut().heal();
        }
        if tick == 5 {
            pad.borrow_mut().press_button(0);
            mgr.rumble_all(true).expect("rumble on");
        }

        mgr.update_all().expect("update devices");
        for (id, ev) in mgr.drain_events() {
            println!("{id}: {ev:?}");
        }
        std::thread::sleep(period.min(Duration::from_millis(20)));
    }

    mgr.rumble_all(false).expect("rumble off");
    println!("{}", mgr.report_json().expect("report"));
    mgr.close_all().expect("close devices");
}
