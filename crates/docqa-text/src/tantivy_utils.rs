use tantivy::tokenizer::{LowerCaser, RemoveLongFilter, SimpleTokenizer, StopWordFilter, TextAnalyzer, TokenStream};

/// English stop words removed before weighting.
pub const ENGLISH_STOP_WORDS: &[&str] = &[
	"a","about","above","after","again","against","all","almost","alone","along","already","also","although","always","am","among","an","and","another","any","anyhow","anyone","anything","anyway","anywhere","are","around","as","at",
	"be","became","because","become","becomes","been","before","beforehand","being","below","beside","besides","between","beyond","both","but","by",
	"can","cannot","could","did","do","does","doing","done","down","due","during","each","either","else","elsewhere","enough","etc","even","ever","every","everyone","everything","everywhere","except",
	"few","for","former","formerly","from","further","had","has","hasnt","have","having","he","hence","her","here","hereafter","hereby","herein","hers","herself","him","himself","his","how","however",
	"i","ie","if","in","indeed","into","is","it","its","itself","just","latter","latterly","least","less","ltd","made","many","may","me","meanwhile","might","mine","more","moreover","most","mostly","much","must","my","myself",
	"namely","neither","never","nevertheless","next","no","nobody","none","noone","nor","not","nothing","now","nowhere","of","off","often","on","once","one","only","onto","or","other","others","otherwise","our","ours","ourselves","out","over","own",
	"per","perhaps","please","rather","re","same","seem","seemed","seeming","seems","several","she","should","since","so","some","somehow","someone","something","sometime","sometimes","somewhere","still","such",
	"than","that","the","their","theirs","them","themselves","then","thence","there","thereafter","thereby","therefore","therein","thereupon","these","they","this","those","though","through","throughout","thru","thus","to","together","too","toward","towards",
	"under","until","up","upon","us","very","via","was","we","well","were","what","whatever","when","whence","whenever","where","whereafter","whereas","whereby","wherein","whereupon","wherever","whether","which","while","whither","who","whoever","whole","whom","whose","why","will","with","within","without","would",
	"yet","you","your","yours","yourself","yourselves",
];

/// Tokens longer than this are dropped (base64 blobs, URLs glued together by extraction).
const MAX_TOKEN_LEN: usize = 40;

pub fn build_analyzer() -> TextAnalyzer {
	TextAnalyzer::builder(SimpleTokenizer::default())
		.filter(RemoveLongFilter::limit(MAX_TOKEN_LEN))
		.filter(LowerCaser)
		.filter(StopWordFilter::remove(ENGLISH_STOP_WORDS.iter().map(|s| (*s).to_string())))
		.build()
}

/// Run `text` through the analyzer, keeping terms of two or more characters.
pub fn analyze(analyzer: &mut TextAnalyzer, text: &str) -> Vec<String> {
	let mut stream = analyzer.token_stream(text);
	let mut terms = Vec::new();
	while stream.advance() {
		let token = stream.token();
		if token.text.chars().count() > 1 { terms.push(token.text.clone()); }
	}
	terms
}
