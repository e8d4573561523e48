//! Watches ADC0 for a sine wave and lights the indicator LED while its frequency is in band.
#![no_std]
#![no_main]
#![doc(html_playground_url = "https://play.rust-lang.org/")]
#![warn(missing_docs)]

use defmt::{debug, info};
#[allow(unused_imports)]
use defmt_rtt as _;
use embedded_hal_0_2::adc::OneShot;
#[allow(unused_imports)]
use panic_probe as _;
use rp2040_hal::{
    adc::{Adc, AdcPin},
    clocks::init_clocks_and_plls,
    entry,
    fugit::MicrosDurationU32,
    gpio::{
        bank0::{Gpio25, Gpio26},
        FunctionSio, FunctionSioInput, Pin, Pins, PullDown, PullNone, SioOutput,
    },
    pac::{self, interrupt},
    prelude::*,
    timer::{Alarm, Alarm0, Instant, Timer},
    Sio, Watchdog,
};
use sin_freq_detect::{
    config::{DetectorConfig, REPORT_PERIOD_MS, SAMPLE_RATE_HZ, WATCHDOG_FEED_DIVIDER},
    detector::Detector,
    indicator::{PinIndicator, Polarity},
    interrupt::{Deadline, IrqSlot, DETECTOR_STATE},
    report::{LogReporter, ReportTask},
    sampler::{AdcSource, ChannelId, Sampler},
};

/// Second-stage bootloader, from [rp2040-boot2](https://docs.rs/rp2040-boot2)
#[link_section = ".boot2"]
#[used]
pub static BOOT2: [u8; 256] = rp2040_boot2::BOOT_LOADER_W25Q080;
/// External high-speed crystal on the pico board is 12Mhz
pub const XOSC_FREQ_HZ: u32 = 12_000_000;
/// Time between sampling interrupts (5 kHz)
pub const SAMPLE_PERIOD: MicrosDurationU32 =
    MicrosDurationU32::micros((1_000_000.0 / SAMPLE_RATE_HZ) as u32);
/// Watchdog timeout. Must exceed [`WATCHDOG_FEED_DIVIDER`] report periods.
pub const WATCHDOG_TIMEOUT: MicrosDurationU32 = MicrosDurationU32::millis(1_500);
/// ADC0 on GPIO26 carries the monitored signal
const SIGNAL_CHANNEL: ChannelId = ChannelId(0);

#[cfg(feature = "active_low_led")]
/// LED wired between 3V3 and the pin
const LED_POLARITY: Polarity = Polarity::ActiveLow;
#[cfg(not(feature = "active_low_led"))]
/// On-board LED
const LED_POLARITY: Polarity = Polarity::ActiveHigh;

/// Indicator LED pin
type LedPin = Pin<Gpio25, FunctionSio<SioOutput>, PullDown>;

/// ADC with the signal input attached
struct SignalInput {
    /// Converter
    adc: Adc,
    /// GPIO26 configured as ADC0
    pin: AdcPin<Pin<Gpio26, FunctionSioInput, PullNone>>,
}

impl AdcSource for SignalInput {
    fn read(&mut self, _channel: ChannelId) -> Option<u16> {
        // Only one channel is wired; a failed conversion is dropped from the average
        OneShot::<Adc, u16, _>::read(&mut self.adc, &mut self.pin).ok()
    }
}

/// Everything owned by the sampling interrupt
struct Sampling {
    /// Free-running microsecond counter
    timer: Timer,
    /// Re-armed on every interrupt
    alarm: Alarm0,
    /// Absolute time of the next sampling tick
    deadline: Deadline,
    /// Sub-conversion source
    input: SignalInput,
    /// Averaging front end
    sampler: Sampler<1>,
    /// Estimation, classification and indicator
    detector: Detector<'static, PinIndicator<LedPin>>,
}

/// Sampling state for access in [`TIMER_IRQ_0`]
static SAMPLING: IrqSlot<Sampling> = IrqSlot::new();

/// Main operation loop
#[entry]
fn main() -> ! {
    info!(
        "{} v{} startup",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    );
    let mut pac = pac::Peripherals::take().unwrap();
    let core = pac::CorePeripherals::take().unwrap();
    let mut watchdog = Watchdog::new(pac.WATCHDOG);
    let sio = Sio::new(pac.SIO);

    let clocks = init_clocks_and_plls(
        XOSC_FREQ_HZ,
        pac.XOSC,
        pac.CLOCKS,
        pac.PLL_SYS,
        pac.PLL_USB,
        &mut pac.RESETS,
        &mut watchdog,
    )
    .ok()
    .unwrap();
    info!(
        "core clock: {=u32} MHz",
        clocks.system_clock.freq().to_MHz()
    );
    let pins = Pins::new(
        pac.IO_BANK0,
        pac.PADS_BANK0,
        sio.gpio_bank0,
        &mut pac.RESETS,
    );

    let config = DetectorConfig::DEFAULT;
    config.validate().unwrap();

    // Indicator and detector
    let led = PinIndicator::new(pins.gpio25.into_push_pull_output(), LED_POLARITY);
    let detector = Detector::new(
        SIGNAL_CHANNEL,
        config.estimator,
        config.classifier,
        led,
        &DETECTOR_STATE,
    )
    .unwrap();
    let sampler = Sampler::new([SIGNAL_CHANNEL], config.sampler).unwrap();
    info!("detector: ok");

    // ADC input
    let adc = Adc::new(pac.ADC, &mut pac.RESETS);
    let pin = AdcPin::new(pins.gpio26.into_floating_input()).unwrap();
    info!("adc: ok");

    // Sampling timer
    let mut timer = Timer::new(pac.TIMER, &mut pac.RESETS, &clocks);
    let mut alarm = timer.alarm_0().unwrap();
    let deadline = Deadline::new(
        timer.get_counter().ticks(),
        u64::from(SAMPLE_PERIOD.ticks()),
    );
    alarm
        .schedule_at(Instant::from_ticks(deadline.next()))
        .unwrap();
    alarm.enable_interrupt();

    debug!("critical_section: transfer sampling state to mutex");
    SAMPLING.install(Sampling {
        timer,
        alarm,
        deadline,
        input: SignalInput { adc, pin },
        sampler,
        detector,
    });

    watchdog.pause_on_debug(true);
    watchdog.start(WATCHDOG_TIMEOUT);
    info!("watchdog: ok");

    unsafe { pac::NVIC::unmask(pac::Interrupt::TIMER_IRQ_0) }
    info!("running");

    let mut delay = cortex_m::delay::Delay::new(core.SYST, clocks.system_clock.freq().to_Hz());
    let mut report = ReportTask::new(LogReporter, WATCHDOG_FEED_DIVIDER);
    loop {
        delay.delay_ms(REPORT_PERIOD_MS);
        if report.poll(&DETECTOR_STATE) {
            watchdog.feed();
        }
    }
}

/// Sampling tick: average one batch and run it through the detector
#[interrupt]
fn TIMER_IRQ_0() {
    SAMPLING.with(|sampling| {
        sampling.alarm.clear_interrupt();
        let next = sampling
            .deadline
            .advance(sampling.timer.get_counter().ticks());
        // Only fails for deadlines the alarm cannot represent
        let _ = sampling.alarm.schedule_at(Instant::from_ticks(next));
        sampling
            .sampler
            .convert(&mut sampling.input, &mut sampling.detector);
    });
}
