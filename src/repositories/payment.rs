use rand::Rng;
use rust_decimal::Decimal;

use crate::models::payment::{BoletoSlip, PaymentBundle, PixCharge};

/// Produces the placeholder payment instruments attached to a batch.
/// Injectable so tests can swap in a deterministic generator.
pub trait InstrumentGenerator: Send + Sync {
    fn pix_charge(&self, amount: Decimal) -> PixCharge;
    fn boleto_slip(&self, batch_id: u32) -> BoletoSlip;

    fn bundle(&self, amount: Decimal, batch_id: u32) -> PaymentBundle {
        PaymentBundle {
            pix: self.pix_charge(amount),
            boleto: self.boleto_slip(batch_id),
        }
    }
}

pub struct RandomInstrumentGenerator {
    payee_name: String,
    merchant_city: String,
    base_url: String,
}

impl RandomInstrumentGenerator {
    pub fn new(payee_name: String, merchant_city: String, base_url: String) -> Self {
        RandomInstrumentGenerator {
            payee_name,
            merchant_city,
            base_url,
        }
    }
}

const BASE36: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

fn token(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect()
}

fn digits(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
        .collect()
}

impl InstrumentGenerator for RandomInstrumentGenerator {
    fn pix_charge(&self, amount: Decimal) -> PixCharge {
        let mut rng = rand::thread_rng();
        let qr_payload = format!(
            "00020126580014BR.GOV.BCB.PIX0136{key}52040000530398\
             65802BR59{name_len:02}{name}60{city_len:02}{city}62070503***6304{crc:04}",
            key = token(36),
            name_len = self.payee_name.chars().count(),
            name = self.payee_name,
            city_len = self.merchant_city.chars().count(),
            city = self.merchant_city,
            crc = rng.gen_range(0..10_000),
        );

        PixCharge {
            qr_payload,
            pix_key: format!("{}@pix.com", token(13)),
            amount,
            payee_name: self.payee_name.clone(),
            reference_id: format!("PGTO{:06}", rng.gen_range(0..1_000_000)),
        }
    }

    fn boleto_slip(&self, batch_id: u32) -> BoletoSlip {
        let mut rng = rand::thread_rng();

        BoletoSlip {
            download_url: format!(
                "{}/boletos/download/{}/{}.pdf",
                self.base_url,
                batch_id,
                token(13)
            ),
            digitable_line: format!(
                "23793.{} {}.{} {}.{} {} {}",
                digits(5),
                digits(5),
                digits(5),
                digits(5),
                digits(5),
                rng.gen_range(0..9),
                digits(5)
            ),
        }
    }
}

/// Deterministic generator for tests.
pub struct FixedInstrumentGenerator;

impl InstrumentGenerator for FixedInstrumentGenerator {
    fn pix_charge(&self, amount: Decimal) -> PixCharge {
        PixCharge {
            qr_payload: "00020126580014BR.GOV.BCB.PIX0136chave-de-teste6304FFFF".to_string(),
            pix_key: "pagamentos@pix.com".to_string(),
            amount,
            payee_name: "Sistema de Beneficiarios LTDA".to_string(),
            reference_id: "PGTO000000".to_string(),
        }
    }

    fn boleto_slip(&self, batch_id: u32) -> BoletoSlip {
        BoletoSlip {
            download_url: format!(
                "http://localhost:3000/boletos/download/{}/fixo.pdf",
                batch_id
            ),
            digitable_line: "23793.00000 00000.00000 00000.00000 0 00000".to_string(),
        }
    }
}
