// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Pin definitions for STM32F777 MCU for the balancer.

use stm32f7xx_hal::{
    gpio::{gpioa, gpiob, gpiod, Alternate, Input, OpenDrain, Output, PullUp, PushPull},
    pac,
    prelude::*,
};

/// GPIOA lines of the phase A inputs, used as EXTI lines.
pub const ENCODER_L_A_LINE: u8 = 0;
pub const ENCODER_R_A_LINE: u8 = 6;
/// GPIOA pins of the phase B inputs.
pub const ENCODER_L_B_PIN: u8 = 1;
pub const ENCODER_R_B_PIN: u8 = 7;

/// All board pins. Construct this once at startup using:
///
/// ```rust
/// let pins = BoardPins::new(dp.GPIOA, dp.GPIOB, dp.GPIOD);
/// ```
pub struct BoardPins {
    pub leds: LedPins,
    pub usart1: Usart1Pins,
    pub i2c1: I2c1Pins,
    pub motor_l: MotorPins<gpiod::PD12<Alternate<2>>, gpiod::PD13<Alternate<2>>>,
    pub motor_r: MotorPins<gpiod::PD14<Alternate<2>>, gpiod::PD15<Alternate<2>>>,
    pub encoder: EncoderPins,
}

pub struct LedPins {
    pub red: gpiod::PD8<Output<PushPull>>,
    pub yellow: gpiod::PD9<Output<PushPull>>,
    pub green: gpiod::PD10<Output<PushPull>>,
}

pub struct Usart1Pins {
    pub tx: gpioa::PA9<Alternate<7>>,
    pub rx: gpioa::PA10<Alternate<7>>,
}

/// I2C1 to the MPU6050
pub struct I2c1Pins {
    pub scl: gpiob::PB8<Alternate<4, OpenDrain>>,
    pub sda: gpiob::PB9<Alternate<4, OpenDrain>>,
}

/// MX1616 channel inputs, both on TIM4
pub struct MotorPins<FW, BW> {
    pub forward: FW,
    pub backward: BW,
}

/// Encoder phase inputs. Phase A raises EXTI interrupts, phase B is sampled in the handler.
pub struct EncoderPins {
    pub left_a: gpioa::PA0<Input<PullUp>>,
    pub left_b: gpioa::PA1<Input<PullUp>>,
    pub right_a: gpioa::PA6<Input<PullUp>>,
    pub right_b: gpioa::PA7<Input<PullUp>>,
}

impl BoardPins {
    /// Create all named pins from raw GPIO peripherals.
    pub fn new(gpioa: pac::GPIOA, gpiob: pac::GPIOB, gpiod: pac::GPIOD) -> Self {
        let gpioa = gpioa.split();
        let gpiob = gpiob.split();
        let gpiod = gpiod.split();

        Self {
            leds: LedPins {
                red: gpiod.pd8.into_push_pull_output(),
                yellow: gpiod.pd9.into_push_pull_output(),
                green: gpiod.pd10.into_push_pull_output(),
            },

            usart1: Usart1Pins {
                tx: gpioa.pa9.into_alternate::<7>(),
                rx: gpioa.pa10.into_alternate::<7>(),
            },

            i2c1: I2c1Pins {
                scl: gpiob.pb8.into_alternate_open_drain::<4>(),
                sda: gpiob.pb9.into_alternate_open_drain::<4>(),
            },

            // TIM4_CH1 / TIM4_CH2
            motor_l: MotorPins {
                forward: gpiod.pd12.into_alternate::<2>(),
                backward: gpiod.pd13.into_alternate::<2>(),
            },

            // TIM4_CH3 / TIM4_CH4
            motor_r: MotorPins {
                forward: gpiod.pd14.into_alternate::<2>(),
                backward: gpiod.pd15.into_alternate::<2>(),
            },

            encoder: EncoderPins {
                left_a: gpioa.pa0.into_pull_up_input(),
                left_b: gpioa.pa1.into_pull_up_input(),
                right_a: gpioa.pa6.into_pull_up_input(),
                right_b: gpioa.pa7.into_pull_up_input(),
            },
        }
    }
}
