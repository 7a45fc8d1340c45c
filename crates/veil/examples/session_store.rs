// Index a few sessions under encryption, search them, and store their blobs
// both replicated and sharded across storage backends.

use std::{env, error::Error, process::exit};

use rand::{thread_rng, Rng};
use veil::{
    index::{BooleanOperator, SearchEngine},
    paillier::ParametersBuilder,
    replication::ReplicationManager,
    storage::BackendConfig,
};

fn print_notice_and_exit(error: Option<String>) -> ! {
    println!("  overview: Encrypted session store");
    println!(
        "     usage: session_store [-h] [--help] [--num_backends=<value>] [--threshold=<value>] [--key_bits=<value>] [--base_path=<dir>]"
    );
    println!("constraints: 2 <= threshold <= num_backends, key_bits >= 512");
    if let Some(error) = error {
        println!("     error: {}", error);
    }
    exit(0);
}

fn parse_arg(arg: &str, name: &str) -> usize {
    let a: Vec<&str> = arg.rsplit('=').collect();
    match a[0].parse::<usize>() {
        Ok(value) if a.len() == 2 => value,
        _ => print_notice_and_exit(Some(format!("Invalid `{}` argument", name))),
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let args: Vec<String> = env::args().skip(1).collect();
    if args.contains(&"-h".to_string()) || args.contains(&"--help".to_string()) {
        print_notice_and_exit(None)
    }

    let mut num_backends = 5;
    let mut threshold = 3;
    let mut key_bits = 1024;
    let mut base_path = None;
    for arg in &args {
        if arg.starts_with("--num_backends") {
            num_backends = parse_arg(arg, "--num_backends");
        } else if arg.starts_with("--threshold") {
            threshold = parse_arg(arg, "--threshold");
        } else if arg.starts_with("--key_bits") {
            key_bits = parse_arg(arg, "--key_bits");
        } else if let Some(path) = arg.strip_prefix("--base_path=") {
            base_path = Some(path.to_string());
        } else {
            print_notice_and_exit(Some(format!("Unrecognized argument: {}", arg)))
        }
    }
    if threshold < 2 || threshold > num_backends {
        print_notice_and_exit(Some("Invalid threshold".to_string()))
    }

    // Index
    let mut rng = thread_rng();
    let par = ParametersBuilder::new().set_key_bits(key_bits).build_arc()?;
    let engine = SearchEngine::new(&par, &mut rng)?;
    let sessions = [
        ("S1", 2024, vec!["project", "alpha", "secure"]),
        ("S2", 2023, vec!["bravo", "test"]),
        ("S3", 2024, vec!["gamma", "project"]),
    ];
    for (session_id, year, keywords) in &sessions {
        engine.build_numeric_entry(session_id, *year)?;
        engine.build_keyword_entry(session_id, keywords);
    }

    println!("Sessions of 2024: {:?}", engine.search_numeric(&[2024], BooleanOperator::Or)?);
    println!(
        "Sessions with project AND alpha: {:?}",
        engine.search_keywords(["project", "alpha"], BooleanOperator::And)
    );
    println!(
        "Sessions with project OR bravo: {:?}",
        engine.search_keywords(["project", "bravo"], BooleanOperator::Or)
    );

    // Storage
    let configs = (0..num_backends)
        .map(|i| match &base_path {
            Some(path) => BackendConfig::Local {
                base_path: format!("{}/backend-{}", path, i).into(),
            },
            None => BackendConfig::Memory,
        })
        .collect::<Vec<_>>();
    let manager = ReplicationManager::from_configs(&configs)?;

    let blob = (0..4096).map(|_| rng.gen::<u8>()).collect::<Vec<_>>();
    let replicas = manager.replicate_upload("S1", &blob)?;
    assert_eq!(manager.replica_download(&replicas)?, blob);
    println!("Replicated {} bytes to {} backends", blob.len(), replicas.len());

    let shards = manager.shard_upload("S1", &blob, threshold)?;
    assert_eq!(manager.shard_download(&shards)?, blob);
    println!(
        "Sharded {} bytes over {} backends with threshold {}",
        blob.len(),
        shards.len(),
        threshold
    );

    for locators in [replicas, shards] {
        let locators = locators.into_iter().map(Some).collect::<Vec<_>>();
        manager.delete_all(&locators);
    }

    Ok(())
}
