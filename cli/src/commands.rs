use crate::{Commands, DhCommands, KnapsackCommands, PolyKeyArgs, RsaCommands, TrithemiusCommands};

use lab_crypto::cancel::CancelToken;
use lab_crypto::classic;
use lab_crypto::config::LabConfig;
use lab_crypto::dh::{self, DhKeyPair, DhParams, symmetric};
use lab_crypto::errors::LabCryptoError;
use lab_crypto::knapsack::{self, KnapsackKeyPair};
use lab_crypto::rsa;
use lab_crypto::trithemius::analysis::{self, SearchOptions};
use lab_crypto::trithemius::{self, PolyKey};
use serde::Serialize;

/// Both sides of a simulated exchange.
#[derive(Serialize)]
struct ExchangeReport {
    params: DhParams,
    alice: DhKeyPair,
    bob: DhKeyPair,
    shared_secret: String,
    key_material: String,
}

#[derive(Serialize)]
struct GammaReport {
    pad: String,
    cipher: String,
}

#[derive(Serialize)]
struct RankedCandidate {
    key: PolyKey,
    #[serde(flatten)]
    candidate: analysis::FrequencyCandidate,
}

fn to_json<T: Serialize>(value: &T) -> Result<String, LabCryptoError> {
    Ok(serde_json::to_string_pretty(value)?)
}

fn search_options(config: &LabConfig) -> SearchOptions {
    SearchOptions {
        threads: config.threads(),
        cancel: CancelToken::new(),
    }
}

/// Executes one command and returns what goes to stdout.
pub fn run(command: Commands, config: &LabConfig) -> Result<String, LabCryptoError> {
    match command {
        Commands::Rsa { action } => run_rsa(action, config),
        Commands::Dh { action } => run_dh(action, config),
        Commands::Knapsack { action } => run_knapsack(action, config),
        Commands::Trithemius { action } => run_trithemius(action, config),
        Commands::Caesar {
            text,
            shift,
            decrypt,
        } => Ok(if decrypt {
            classic::caesar_decrypt(&text, shift)
        } else {
            classic::caesar_encrypt(&text, shift)
        }),
        Commands::Gamma {
            text,
            gamma,
            one_time_pad,
            language,
            binary,
        } => {
            let mut out = if one_time_pad {
                let pad = classic::generate_one_time_pad(text.chars().count(), language);
                let gamma = format!("{}{}", classic::gamma::ONE_TIME_PAD_PREFIX, pad);
                let cipher = classic::gamma_encrypt(&text, &gamma, language)?;
                to_json(&GammaReport { pad: gamma, cipher })?
            } else {
                let gamma = gamma.ok_or_else(|| {
                    LabCryptoError::InvalidArgument(
                        "Either --gamma or --one-time-pad is required".to_string(),
                    )
                })?;
                classic::gamma_encrypt(&text, &gamma, language)?
            };
            if binary {
                out.push('\n');
                out.push_str(&classic::binary_representation(&text, language));
            }
            Ok(out)
        }
        Commands::Frequency { text } => to_json(&analysis::symbol_frequencies(&text)?),
    }
}

fn run_rsa(action: RsaCommands, config: &LabConfig) -> Result<String, LabCryptoError> {
    match action {
        RsaCommands::Keygen { bits } => {
            let bits = bits.unwrap_or(config.rsa_bit_length);
            let keys = rsa::generate_keys(bits, config.miller_rabin_rounds)?;
            to_json(&keys)
        }
        RsaCommands::Encrypt { text, e, n } => rsa::encrypt(&text, &e, &n),
        RsaCommands::Decrypt { cipher, d, n } => rsa::decrypt(&cipher, &d, &n),
    }
}

fn run_dh(action: DhCommands, config: &LabConfig) -> Result<String, LabCryptoError> {
    match action {
        DhCommands::Params { bits } => {
            let bits = bits.unwrap_or(config.dh_prime_bits);
            to_json(&DhParams::generate(bits, config.miller_rabin_rounds)?)
        }
        DhCommands::Exchange { p, g, private_bits } => {
            let params = match (p, g) {
                (Some(p), Some(g)) => DhParams::try_with(p, g)?,
                (Some(p), None) => {
                    let g = dh::find_primitive_root(&p)?;
                    DhParams::try_with(p, g)?
                }
                _ => DhParams::generate(config.dh_prime_bits, config.miller_rabin_rounds)?,
            };
            let private_bits = private_bits.unwrap_or(config.dh_private_bits);
            let alice = DhKeyPair::generate(&params, private_bits)?;
            let bob = DhKeyPair::generate(&params, private_bits)?;

            let alice_secret = alice.agree(&params, &bob.public_key)?;
            let bob_secret = bob.agree(&params, &alice.public_key)?;
            if alice_secret != bob_secret {
                return Err(LabCryptoError::Validation(
                    "Parties derived different secrets".to_string(),
                ));
            }

            let key_material = symmetric::derive_key_material(&alice_secret, config.dh_key_size);
            to_json(&ExchangeReport {
                params,
                alice,
                bob,
                shared_secret: alice_secret.to_string(),
                key_material,
            })
        }
        DhCommands::Encrypt { text, key } => symmetric::encrypt_text(&text, &key),
        DhCommands::Decrypt { cipher, key } => symmetric::decrypt_text(&cipher, &key),
    }
}

fn run_knapsack(action: KnapsackCommands, config: &LabConfig) -> Result<String, LabCryptoError> {
    match action {
        KnapsackCommands::Keygen { size } => {
            to_json(&KnapsackKeyPair::generate(size.unwrap_or(config.knapsack_size))?)
        }
        KnapsackCommands::Encrypt {
            text,
            public_key,
            language,
        } => {
            let public = KnapsackKeyPair::import_public(knapsack::parse_key(&public_key)?)?;
            let cipher = knapsack::encrypt(&text, &public.public_key, language)?;
            Ok(knapsack::format_ciphertext(&cipher))
        }
        KnapsackCommands::Decrypt {
            cipher,
            private_key,
            m,
            n,
            language,
        } => {
            let pair = KnapsackKeyPair::import(knapsack::parse_key(&private_key)?, m, n, None)?;
            knapsack::decrypt(
                &knapsack::parse_ciphertext(&cipher),
                &pair.private_key,
                pair.m,
                pair.n,
                language,
            )
        }
    }
}

fn poly_key(args: PolyKeyArgs) -> Result<PolyKey, LabCryptoError> {
    if let Some(phrase) = args.keyword {
        return Ok(PolyKey::Keyword { phrase });
    }
    match (args.a, args.b, args.c) {
        (Some(a), Some(b), Some(c)) => Ok(PolyKey::Quadratic { a, b, c }),
        (Some(a), Some(b), None) => Ok(PolyKey::Linear { a, b }),
        _ => Err(LabCryptoError::InvalidArgument(
            "Key needs -a and -b (plus -c for a quadratic key) or --keyword".to_string(),
        )),
    }
}

fn run_trithemius(action: TrithemiusCommands, config: &LabConfig) -> Result<String, LabCryptoError> {
    match action {
        TrithemiusCommands::Encrypt {
            text,
            key,
            language,
        } => trithemius::encrypt(&text, &poly_key(key)?, language),
        TrithemiusCommands::Decrypt {
            cipher,
            key,
            language,
        } => trithemius::decrypt(&cipher, &poly_key(key)?, language),
        TrithemiusCommands::FindKey {
            plain,
            cipher,
            language,
        } => {
            let found = analysis::find_key_with(&plain, &cipher, language, &search_options(config))?;
            match found {
                Some(recovered) => to_json(&recovered),
                None => Ok("No key found".to_string()),
            }
        }
        TrithemiusCommands::Attack {
            cipher,
            language,
            top,
        } => {
            let modulus = language.poly_alphabet().len();
            let ranked: Vec<RankedCandidate> =
                analysis::frequency_attack_with(&cipher, language, &search_options(config))?
                    .into_iter()
                    .take(top)
                    .map(|candidate| RankedCandidate {
                        key: candidate.key(modulus),
                        candidate,
                    })
                    .collect();
            to_json(&ranked)
        }
    }
}
