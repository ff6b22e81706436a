use std::env;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use actix_cors::Cors;
use actix_web::{get, put, web, App, HttpResponse, HttpServer, Responder};
use log::{error, info};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Deserialize;

use randtxt_core::io::{get_filename, list_files, normalize_folder};
use randtxt_core::{Chain, Error, Generator, MemoryChain};

/// Extension of chain files in the data directory.
const CHAIN_EXTENSION: &str = "mkv";

/// Query parameters for the `/v1/paragraph` endpoint
#[derive(Deserialize)]
struct ParagraphParams {
	min: Option<usize>,
	max: Option<usize>,
	seed: Option<u64>,
}

#[derive(Deserialize)]
struct ChainQuery {
	name: Option<String>,
}

struct SharedData {
	data_dir: PathBuf,
	chain: RwLock<Option<(String, Arc<MemoryChain>)>>,
}

/// HTTP GET endpoint `/v1/paragraph`
///
/// Generates a paragraph of between `min` and `max` (exclusive) sentences
/// from the loaded chain. Defaults to 3..6.
#[get("/v1/paragraph")]
async fn get_paragraph(data: web::Data<SharedData>, query: web::Query<ParagraphParams>) -> impl Responder {
	let min = query.min.unwrap_or(3);
	let max = query.max.unwrap_or(6);
	if max <= min {
		return HttpResponse::BadRequest().body("max must be greater than min");
	}

	let chain = match data.chain.read() {
		Ok(loaded) => match loaded.as_ref() {
			Some((_, chain)) => Arc::clone(chain),
			None => return HttpResponse::Conflict().body("No chain loaded"),
		},
		Err(_) => return HttpResponse::InternalServerError().body("Chain lock failed"),
	};

	let seed = query.seed;
	let result = web::block(move || -> Result<String, Error> {
		let mut generator = Generator::new(chain)?;
		if let Some(seed) = seed {
			generator = generator.with_rng(StdRng::seed_from_u64(seed));
		}
		generator.paragraph(min, max)
	})
	.await;

	match result {
		Ok(Ok(text)) => HttpResponse::Ok().body(text),
		Ok(Err(e)) => {
			error!("generation failed: {e}");
			HttpResponse::InternalServerError().body(format!("Generation failed: {e}"))
		}
		Err(_) => HttpResponse::InternalServerError().body("Generation was cancelled"),
	}
}

/// HTTP GET endpoint `/v1/chains`, the chain files available for loading.
#[get("/v1/chains")]
async fn get_chains(data: web::Data<SharedData>) -> impl Responder {
	match list_files(&data.data_dir, CHAIN_EXTENSION) {
		Ok(files) => match files.iter().map(get_filename).collect::<std::io::Result<Vec<_>>>() {
			Ok(names) => HttpResponse::Ok().body(names.join("\n")),
			Err(_) => HttpResponse::InternalServerError().body("Failed to list chains"),
		},
		Err(_) => HttpResponse::InternalServerError().body("Failed to list chains"),
	}
}

#[get("/v1/loaded_chain")]
async fn get_loaded_chain(data: web::Data<SharedData>) -> impl Responder {
	match data.chain.read() {
		Ok(loaded) => HttpResponse::Ok().body(loaded.as_ref().map(|(name, _)| name.clone()).unwrap_or_default()),
		Err(_) => HttpResponse::InternalServerError().body("Chain lock failed"),
	}
}

/// HTTP PUT endpoint `/v1/load_chain?name=<name>`
///
/// Loads `<data dir>/<name>.mkv` and makes it the chain paragraphs are
/// generated from.
#[put("/v1/load_chain")]
async fn put_chain(data: web::Data<SharedData>, query: web::Query<ChainQuery>) -> impl Responder {
	let name = match &query.name {
		Some(s) if !s.trim().is_empty() => s.trim().to_owned(),
		_ => return HttpResponse::BadRequest().body("Missing or empty chain name"),
	};
	if name.contains(['/', '\\']) || name.starts_with('.') {
		return HttpResponse::BadRequest().body("Invalid chain name");
	}

	let path = data.data_dir.join(format!("{name}.{CHAIN_EXTENSION}"));
	let chain = match web::block(move || MemoryChain::open(path)).await {
		Ok(Ok(chain)) => chain,
		Ok(Err(e)) => return HttpResponse::InternalServerError().body(format!("Failed to load chain: {e}")),
		Err(_) => return HttpResponse::InternalServerError().body("Loading was cancelled"),
	};

	// Reject chains that cannot generate before replacing the current one.
	let chain = Arc::new(chain);
	if let Err(e) = Generator::new(Arc::clone(&chain)) {
		return HttpResponse::UnprocessableEntity().body(format!("Invalid chain: {e}"));
	}

	match data.chain.write() {
		Ok(mut loaded) => {
			info!("loaded chain {name} ({} nodes)", chain.len());
			*loaded = Some((name, chain));
			HttpResponse::Ok().body("Chain loaded successfully")
		}
		Err(_) => HttpResponse::InternalServerError().body("Chain lock failed"),
	}
}

/// Main entry point for the server.
///
/// # Configuration
/// - `RANDTXT_DATA_DIR`: directory holding `.mkv` chain files (`./data`)
/// - `RANDTXT_BIND`: listen address (`127.0.0.1:5000`)
#[actix_web::main]
async fn main() -> std::io::Result<()> {
	env_logger::init();

	let data_dir = normalize_folder(&env::var("RANDTXT_DATA_DIR").unwrap_or_else(|_| "./data".to_owned()));
	let bind = env::var("RANDTXT_BIND").unwrap_or_else(|_| "127.0.0.1:5000".to_owned());

	let shared_data = web::Data::new(SharedData {
		data_dir,
		chain: RwLock::new(None),
	});

	info!("serving chains from {} on {bind}", shared_data.data_dir.display());

	HttpServer::new(move || {
		App::new()
			.wrap(Cors::permissive())
			.app_data(shared_data.clone())
			.service(get_paragraph)
			.service(get_chains)
			.service(put_chain)
			.service(get_loaded_chain)
	})
		.bind(bind)?
		.run()
		.await
}
