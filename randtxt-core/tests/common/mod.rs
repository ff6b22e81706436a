#![allow(dead_code)]

use std::sync::Arc;

use randtxt_core::{Builder, MemoryChain, Tag};

/// A small hand-tagged corpus with enough shared phrases to branch.
const CORPUS: &str = "\
The/DT dog/NN ran/VBD to/TO the/DT park/NN ./. \
The/DT cat/NN sat/VBD on/IN the/DT mat/NN ./. \
It/PRP did/VBD n't/RB like/VB the/DT rain/NN ,/, so/RB it/PRP sat/VBD on/IN the/DT step/NN ./. \
Paul/NNP 's/POS dog/NN ran/VBD after/IN the/DT cat/NN ./. \
Did/VBD the/DT cat/NN see/VB the/DT dog/NN ?/. \
Ringo/NNP said/VBD the/DT park/NN was/VBD quiet/JJ ./. \
The/DT park/NN was/VBD full/JJ of/IN dogs/NNS ;/: the/DT cats/NNS stayed/VBD home/NN ./. \
She/PRP 's/VBZ sure/JJ the/DT dog/NN ran/VBD home/NN ./. \
(/-LRB- Quietly/RB )/-RRB- the/DT cat/NN sat/VBD on/IN the/DT dog/NN !/. \
I/PRP saw/VBD the/DT cat/NN ,/, the/DT dog/NN and/CC Paul/NNP ./. \
George/NNP ran/VBD to/TO the/DT mat/NN ./. \
The/DT rain/NN did/VBD n't/RB stop/VB ./. ";

pub fn corpus() -> Vec<Tag> {
	CORPUS.split_whitespace().map(Tag::parse).collect()
}

/// The corpus repeated, so every context shows up several times.
pub fn corpus_stream(repeat: usize) -> Vec<Tag> {
	let tags = corpus();
	let mut stream = Vec::with_capacity(tags.len() * repeat);
	for _ in 0..repeat {
		stream.extend(tags.iter().cloned());
	}
	stream
}

pub fn trigram_chain() -> Arc<MemoryChain> {
	let mut builder = Builder::new(MemoryChain::default(), 3).unwrap();
	builder.feed(vec![corpus_stream(3)]).unwrap();
	Arc::new(builder.into_inner())
}

/// `A B C D A B C D ...` as proper nouns.
pub fn letters(n: usize) -> Vec<Tag> {
	const LETTERS: [&str; 4] = ["A", "B", "C", "D"];
	(0..n).map(|i| Tag::new(LETTERS[i % LETTERS.len()], "NNP")).collect()
}
