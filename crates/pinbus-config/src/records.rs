//! Translation of the machine description into configuration bursts
//!
//! One burst per logical record, each an ordered run of `ConfigEvent`
//! tuples sharing board and topic; receivers reassemble by `index`.
//! The driver transmits every burst uninterrupted before its master
//! loop starts, so emission order here is the order on the wire. The
//! emission order is the one the deployed board firmware expects.

use pinbus_core::ids::{config_key, config_topic, led_type, matrix_type, pwm_type};
use pinbus_core::ConfigEvent;

use crate::error::ConfigError;
use crate::led::{color_order_code, parse_color};
use crate::machine::{LedAssignmentConfig, MachineConfig};

/// A small helper keeping the running `index` of one burst.
struct Burst {
    board: u8,
    topic: u8,
    index: u8,
    events: Vec<ConfigEvent>,
}

impl Burst {
    fn new(board: u8, topic: u8) -> Self {
        Self {
            board,
            topic,
            index: 0,
            events: Vec::new(),
        }
    }

    fn push(&mut self, key: u8, value: u32) -> &mut Self {
        self.events
            .push(ConfigEvent::new(self.board, self.topic, self.index, key, value));
        self.index += 1;
        self
    }

    fn finish(self) -> Vec<ConfigEvent> {
        self.events
    }
}

/// Board addresses the driver should register for switch polling.
pub fn poll_boards(machine: &MachineConfig) -> Vec<u8> {
    machine
        .boards
        .iter()
        .filter(|b| b.poll_events)
        .map(|b| b.number)
        .collect()
}

/// Build every configuration burst for a machine, in dispatch order:
/// platform assignment per board, switches, switch matrix, PWM
/// outputs, LED strings with their per-LED assignments.
pub fn config_bursts(machine: &MachineConfig) -> Result<Vec<Vec<ConfigEvent>>, ConfigError> {
    let mut bursts = Vec::new();
    let platform = u32::from(machine.platform_code());

    for board in &machine.boards {
        let mut burst = Burst::new(board.number, config_topic::PLATFORM);
        burst.push(config_topic::PLATFORM, platform);
        bursts.push(burst.finish());
    }

    for switch in &machine.switches {
        let mut burst = Burst::new(switch.board, config_topic::SWITCHES);
        burst
            .push(config_key::PORT, switch.port)
            .push(config_key::NUMBER, switch.number);
        bursts.push(burst.finish());
    }

    if let Some(matrix) = &machine.switch_matrix {
        let mut burst = Burst::new(matrix.board, config_topic::SWITCH_MATRIX);
        burst
            .push(config_key::ACTIVE_LOW, u32::from(matrix.active_low))
            .push(config_key::MAX_PULSE_TIME, matrix.pulse_time);
        for column in &matrix.columns {
            burst
                .push(config_key::TYPE, u32::from(matrix_type::COLUMN))
                .push(config_key::NUMBER, column.number)
                .push(config_key::PORT, column.port);
        }
        for row in &matrix.rows {
            burst
                .push(config_key::TYPE, u32::from(matrix_type::ROW))
                .push(config_key::NUMBER, row.number)
                .push(config_key::PORT, row.port);
        }
        bursts.push(burst.finish());
    }

    for output in &machine.pwm_output {
        let output_type = match output.output_type.as_str() {
            "flasher" => pwm_type::FLASHER,
            "lamp" => pwm_type::LAMP,
            _ => pwm_type::SOLENOID,
        };
        let mut burst = Burst::new(output.board, config_topic::PWM);
        burst
            .push(config_key::PORT, output.port)
            .push(config_key::NUMBER, output.number)
            .push(config_key::POWER, output.power)
            .push(config_key::MIN_PULSE_TIME, output.min_pulse_time)
            .push(config_key::MAX_PULSE_TIME, output.max_pulse_time)
            .push(config_key::HOLD_POWER, output.hold_power)
            .push(
                config_key::HOLD_POWER_ACTIVATION_TIME,
                output.hold_power_activation_time,
            )
            .push(config_key::FAST_SWITCH, output.fast_flip_switch)
            .push(config_key::TYPE, u32::from(output_type));
        bursts.push(burst.finish());
    }

    for stripe in &machine.led_stripes {
        let mut burst = Burst::new(stripe.board, config_topic::LED_STRING);
        burst
            .push(config_key::PORT, stripe.port)
            .push(
                config_key::TYPE,
                u32::from(color_order_code(&stripe.led_type)?),
            )
            .push(config_key::AMOUNT_LEDS, stripe.amount)
            .push(config_key::LIGHT_UP, stripe.light_up)
            .push(config_key::AFTER_GLOW, stripe.after_glow);
        bursts.push(burst.finish());

        led_assignment_bursts(&mut bursts, &stripe.lamps, led_type::LAMP, stripe.board, stripe.port)?;
        led_assignment_bursts(
            &mut bursts,
            &stripe.flashers,
            led_type::FLASHER,
            stripe.board,
            stripe.port,
        )?;
        led_assignment_bursts(&mut bursts, &stripe.gi, led_type::GI, stripe.board, stripe.port)?;
    }

    Ok(bursts)
}

fn led_assignment_bursts(
    bursts: &mut Vec<Vec<ConfigEvent>>,
    items: &[LedAssignmentConfig],
    role: u8,
    board: u8,
    port: u32,
) -> Result<(), ConfigError> {
    for item in items {
        let mut burst = Burst::new(board, config_topic::LAMPS);
        burst
            .push(config_key::PORT, port)
            .push(config_key::TYPE, u32::from(role))
            .push(config_key::NUMBER, item.number)
            .push(config_key::LED_NUMBER, item.led_number)
            .push(config_key::COLOR, parse_color(&item.color)?);
        bursts.push(burst.finish());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::machine::MachineConfig;

    fn machine() -> MachineConfig {
        serde_yaml::from_str(
            r#"
serialPort: /dev/ttyUSB0
platform: DE
boards:
  - number: 0
    pollEvents: true
  - number: 3
    pollEvents: true
  - number: 4
switches:
  - board: 0
    port: 2
    number: 17
switchMatrix:
  board: 3
  activeLow: true
  pulseTime: 12
  columns:
    - number: 1
      port: 4
  rows:
    - number: 1
      port: 9
pwmOutput:
  - board: 4
    port: 6
    number: 8
    power: 255
    minPulseTime: 10
    maxPulseTime: 60
    holdPower: 32
    holdPowerActivationTime: 50
    fastFlipSwitch: 1
    type: flasher
ledStripes:
  - board: 0
    port: 1
    ledType: GRB
    amount: 8
    lamps:
      - number: 2
        ledNumber: 5
        color: "00FF00"
"#,
        )
        .unwrap()
    }

    #[test]
    fn poll_boards_selects_only_polling_boards() {
        assert_eq!(poll_boards(&machine()), vec![0, 3]);
    }

    #[test]
    fn platform_burst_per_board_comes_first() {
        let bursts = config_bursts(&machine()).unwrap();
        let expected_platform = u32::from(pinbus_core::ids::platform::DATA_EAST);
        for (i, board) in [0u8, 3, 4].iter().enumerate() {
            assert_eq!(
                bursts[i],
                vec![ConfigEvent::new(
                    *board,
                    config_topic::PLATFORM,
                    0,
                    config_topic::PLATFORM,
                    expected_platform
                )]
            );
        }
    }

    #[test]
    fn switch_burst_is_port_then_number() {
        let bursts = config_bursts(&machine()).unwrap();
        assert_eq!(
            bursts[3],
            vec![
                ConfigEvent::new(0, config_topic::SWITCHES, 0, config_key::PORT, 2),
                ConfigEvent::new(0, config_topic::SWITCHES, 1, config_key::NUMBER, 17),
            ]
        );
    }

    #[test]
    fn matrix_burst_has_continuous_indices() {
        let bursts = config_bursts(&machine()).unwrap();
        let matrix = &bursts[4];
        assert_eq!(matrix.len(), 8); // 2 header + 3 per column + 3 per row
        for (i, event) in matrix.iter().enumerate() {
            assert_eq!(event.index, i as u8);
            assert_eq!(event.topic, config_topic::SWITCH_MATRIX);
        }
        assert_eq!(matrix[2].key, config_key::TYPE);
        assert_eq!(matrix[2].value, u32::from(matrix_type::COLUMN));
        assert_eq!(matrix[5].value, u32::from(matrix_type::ROW));
    }

    #[test]
    fn pwm_burst_covers_all_nine_fields() {
        let bursts = config_bursts(&machine()).unwrap();
        let pwm = &bursts[5];
        assert_eq!(pwm.len(), 9);
        assert_eq!(pwm[8].key, config_key::TYPE);
        assert_eq!(pwm[8].value, u32::from(pwm_type::FLASHER));
    }

    #[test]
    fn led_assignment_gets_its_own_burst_with_reset_index() {
        let bursts = config_bursts(&machine()).unwrap();
        let lamp = bursts.last().unwrap();
        assert_eq!(
            lamp,
            &vec![
                ConfigEvent::new(0, config_topic::LAMPS, 0, config_key::PORT, 1),
                ConfigEvent::new(
                    0,
                    config_topic::LAMPS,
                    1,
                    config_key::TYPE,
                    u32::from(led_type::LAMP)
                ),
                ConfigEvent::new(0, config_topic::LAMPS, 2, config_key::NUMBER, 2),
                ConfigEvent::new(0, config_topic::LAMPS, 3, config_key::LED_NUMBER, 5),
                ConfigEvent::new(0, config_topic::LAMPS, 4, config_key::COLOR, 0x0000_FF00),
            ]
        );
    }
}
