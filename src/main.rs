// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

#![no_main]
#![no_std]

use core::fmt::{self, Write};

use cortex_m::peripheral::NVIC;
use cortex_m_rt::entry;
use panic_halt as _;

use hal::{
    i2c::{BlockingI2c, Mode},
    pac::{self, interrupt},
    prelude::*,
    serial::{Config, Serial},
};
use stm32f7xx_hal as hal;

use embedded_hal::digital::v2::OutputPin;

use balancer::app::{Balancer, Parts};
use balancer::config;
use balancer::control::State;
use balancer::drivers::mpu6050::Offsets;
use balancer::drivers::{EdgeQueue, Mpu6050, Mx1616};
use balancer::hw::pins::{ENCODER_L_A_LINE, ENCODER_L_B_PIN, ENCODER_R_A_LINE, ENCODER_R_B_PIN};
use balancer::hw::{clock, exti, pwm, BackupSram, BoardPins, Led, MonoTimer, Usart};
use balancer::sensors::TimingEstimator;
use balancer::time::millis;

static ENCODER_L: EdgeQueue = EdgeQueue::new(config::ENCODER_L_FW_LEVEL);
static ENCODER_R: EdgeQueue = EdgeQueue::new(config::ENCODER_R_FW_LEVEL);

#[entry]
fn main() -> ! {
    // Peripherals
    let dp = pac::Peripherals::take().unwrap();

    // Clocks
    let rcc = dp.RCC.constrain();
    let clocks = rcc.cfgr.sysclk(216.MHz()).freeze();
    let mut apb1 = rcc.apb1;
    let timer_hz = clocks.timclk1().raw();

    // GPIO
    let pins = BoardPins::new(dp.GPIOA, dp.GPIOB, dp.GPIOD);

    // LED
    let mut led_red = Led::active_low(pins.leds.red);
    let mut led_yellow = Led::active_low(pins.leds.yellow);
    let mut led_green = Led::active_low(pins.leds.green);

    // USART1 (DBG + tuning)
    let usart_cfg = Config {
        baud_rate: config::SERIAL_BAUD.bps(),
        ..Default::default()
    };
    let serial = Serial::new(dp.USART1, (pins.usart1.tx, pins.usart1.rx), &clocks, usart_cfg);
    let mut usart = Usart::new(serial);

    // TIM5 (monotonic clock)
    let clock = MonoTimer::tim5(dp.TIM5, timer_hz);

    // TIM4 (motor PWM)
    let (l_fw, l_bw, r_fw, r_bw) = pwm::tim4(dp.TIM4, timer_hz, config::MOTOR_PWM_HZ);

    // I2C1 (MPU6050)
    let i2c = BlockingI2c::i2c1(
        dp.I2C1,
        (pins.i2c1.scl, pins.i2c1.sda),
        Mode::fast(400_000.Hz()),
        &clocks,
        &mut apb1,
        50_000,
    );

    let now = clock.now();
    let encoder = |queue: &'static EdgeQueue| {
        TimingEstimator::new(
            queue,
            config::ENCODER_SAMPLE_PERIOD,
            config::PULSES_PER_REVOLUTION,
            config::MIN_PULSE_DURATION,
            config::PULSE_TIMEOUT,
            now,
        )
    };

    let parts = Parts {
        sensor: Mpu6050::new(i2c, config::GYRO_ADDRESS).with_offsets(Offsets {
            accel: config::GYRO_OFFSET_ACCEL,
            gyro: config::GYRO_OFFSET_GYRO,
        }),
        encoder_left: encoder(&ENCODER_L),
        encoder_right: encoder(&ENCODER_R),
        motor_left: Mx1616::new(l_fw, l_bw),
        motor_right: Mx1616::new(r_fw, r_bw),
        storage: BackupSram::new(dp.PWR),
    };

    // Encoder phase A edges
    exti::listen_rising((1 << ENCODER_L_A_LINE) | (1 << ENCODER_R_A_LINE));
    unsafe {
        NVIC::unmask(pac::Interrupt::EXTI0);
        NVIC::unmask(pac::Interrupt::EXTI9_5);
    }

    let mut balancer = match Balancer::start(parts, &mut usart) {
        Ok(balancer) => balancer,
        Err(fault) => halt(&mut usart, &mut led_red, &clock, fault),
    };
    led_yellow.on();

    loop {
        while let Some(byte) = usart.read_byte() {
            let _ = balancer.handle_byte(byte, &mut usart);
        }

        let now = clock.now();
        if let Err(fault) = balancer.cycle(now, &mut usart) {
            balancer.stop();
            led_yellow.off();
            led_green.off();
            halt(&mut usart, &mut led_red, &clock, fault);
        }

        match balancer.state() {
            State::Idle => led_green.off(),
            State::Starting => led_green.blink(now, millis(100)),
            State::Running => led_green.on(),
        }
    }
}

/// Report a fatal fault and blink `led` forever. Motors must already be stopped.
fn halt<W, P, F>(log: &mut W, led: &mut Led<P>, clock: &MonoTimer, fault: F) -> !
where
    W: Write,
    P: OutputPin,
    F: fmt::Display,
{
    let _ = writeln!(log, "# fatal: {}\r", fault);

    loop {
        led.blink(clock.now(), millis(50));
    }
}

#[interrupt]
fn EXTI0() {
    if exti::is_pending(ENCODER_L_A_LINE) {
        exti::clear_pending(ENCODER_L_A_LINE);
        ENCODER_L.on_edge(exti::porta_level(ENCODER_L_B_PIN), clock::now());
    }
}

#[interrupt]
fn EXTI9_5() {
    if exti::is_pending(ENCODER_R_A_LINE) {
        exti::clear_pending(ENCODER_R_A_LINE);
        ENCODER_R.on_edge(exti::porta_level(ENCODER_R_B_PIN), clock::now());
    }
}
