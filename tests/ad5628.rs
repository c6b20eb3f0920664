use ad5628_ad7193::ad5628::{self, Ad5628, PowerMode};
use ad5628_ad7193::Error;
use embedded_hal_mock::eh1::spi::{Mock as MockSpi, Transaction as MockTransaction};

fn write_word(word: u32) -> [MockTransaction<u8>; 3] {
    [
        MockTransaction::transaction_start(),
        MockTransaction::write_vec(word.to_be_bytes().to_vec()),
        MockTransaction::transaction_end(),
    ]
}

#[test]
fn write_and_update_encodes_opcode_and_channel() {
    for ch in (0u8..8).chain([ad5628::ALL_CHANNELS]) {
        let word = (0x03 << 24) | ((ch as u32) << 20) | (0x0ABC << 8);
        let trans = write_word(word);
        let mut dac = Ad5628::new(MockSpi::new(&trans));
        dac.write_and_update_dac(ch, 0x0ABC).unwrap();
        dac.destroy().done();
    }
}

#[test]
fn update_dac_encodes_opcode_and_channel() {
    let trans = write_word(0x012A_BC00);
    let mut dac = Ad5628::new(MockSpi::new(&trans));
    dac.update_dac(ad5628::CHANNEL_C, 0x0ABC).unwrap();
    dac.destroy().done();
}

#[test]
fn update_dac_truncates_to_data_field() {
    // 0xFFFF shifted to bit 8 overflows the 20 bit field; the top nibble
    // is dropped
    let trans = write_word(0x010F_FF00);
    let mut dac = Ad5628::new(MockSpi::new(&trans));
    dac.update_dac(ad5628::CHANNEL_A, 0xFFFF).unwrap();
    dac.destroy().done();
}

#[test]
fn invalid_channels_rejected() {
    let trans: [MockTransaction<u8>; 0] = [];
    let mut dac = Ad5628::new(MockSpi::new(&trans));
    for ch in [8u8, 9, 14, 16, 255] {
        assert!(matches!(dac.update_dac(ch, 0), Err(Error::InvalidChannel)));
        assert!(matches!(
            dac.write_and_update_dac(ch, 0),
            Err(Error::InvalidChannel)
        ));
        assert!(matches!(
            dac.write_input_update_all(ch, 0),
            Err(Error::InvalidChannel)
        ));
        assert!(matches!(
            dac.write_input_register(ch, 0),
            Err(Error::InvalidChannel)
        ));
        assert!(matches!(dac.load_ldac(ch), Err(Error::InvalidChannel)));
    }
    dac.destroy().done();
}

#[test]
fn write_input_register_sends_raw_data_field() {
    let trans = write_word(0x00F0_0FFF);
    let mut dac = Ad5628::new(MockSpi::new(&trans));
    dac.write_input_register(ad5628::ALL_CHANNELS, 0xFFF).unwrap();
    dac.destroy().done();
}

#[test]
fn write_input_update_all_encodes_software_ldac() {
    let trans = write_word(0x0221_2300);
    let mut dac = Ad5628::new(MockSpi::new(&trans));
    dac.write_input_update_all(ad5628::CHANNEL_C, 0x123).unwrap();
    dac.destroy().done();
}

#[test]
fn load_clear_code_midscale() {
    let trans = write_word(0x0508_0000);
    let mut dac = Ad5628::new(MockSpi::new(&trans));
    dac.load_clear_code(ad5628::CLEAR_MIDSCALE).unwrap();
    dac.destroy().done();
}

#[test]
fn load_clear_code_zero_and_fullscale() {
    let trans: Vec<MockTransaction<u8>> = write_word(0x0500_0000)
        .into_iter()
        .chain(write_word(0x050F_FFFF))
        .collect();
    let mut dac = Ad5628::new(MockSpi::new(&trans));
    dac.load_clear_code(ad5628::CLEAR_ZERO).unwrap();
    dac.load_clear_code(ad5628::CLEAR_FULLSCALE).unwrap();
    dac.destroy().done();
}

#[test]
fn load_clear_code_rejects_arbitrary_values() {
    let trans: [MockTransaction<u8>; 0] = [];
    let mut dac = Ad5628::new(MockSpi::new(&trans));
    assert!(matches!(
        dac.load_clear_code(0x12345),
        Err(Error::InvalidClearCode)
    ));
    dac.destroy().done();
}

#[test]
fn load_ldac_sets_channel_mask_bit() {
    let trans = write_word(0x0600_0800);
    let mut dac = Ad5628::new(MockSpi::new(&trans));
    dac.load_ldac(ad5628::CHANNEL_D).unwrap();
    dac.destroy().done();
}

#[test]
fn power_down_encodes_mode_and_mask() {
    let trans: Vec<MockTransaction<u8>> = write_word(0x0400_0205)
        .into_iter()
        .chain(write_word(0x0400_00FF))
        .collect();
    let mut dac = Ad5628::new(MockSpi::new(&trans));
    dac.power_down(PowerMode::PowerDown100k, 0b0000_0101).unwrap();
    dac.power_down(PowerMode::Normal, 0xFF).unwrap();
    dac.destroy().done();
}

#[test]
fn reset_is_opcode_only() {
    let trans = write_word(0x0700_0000);
    let mut dac = Ad5628::new(MockSpi::new(&trans));
    dac.reset().unwrap();
    dac.destroy().done();
}

#[test]
fn internal_reference_on_off() {
    let trans: Vec<MockTransaction<u8>> = write_word(0x0800_0100)
        .into_iter()
        .chain(write_word(0x0800_0000))
        .collect();
    let mut dac = Ad5628::new(MockSpi::new(&trans));
    dac.set_internal_reference(true).unwrap();
    dac.set_internal_reference(false).unwrap();
    dac.destroy().done();
}
