use std::hint::black_box;

use criterion::Criterion;

use ass_overrides::blocks;
use ass_overrides::tags::{Tag, parse_tags};

const NO_TAGS: &str = "Sphinx of black quartz, judge my vow.";
const FEW_TAGS: &str = r"{\i1\c&HFF0000&}Sphinx of black quartz, judge my vow.";
const MANY_TAGS: &str = r"{\xbord1\ybord2\xshad3\yshad4\fax5\fay6\clip(70,80,90,100)\iclip(20,20,30,30)\iclip(1,m 0 0 s 20 0 20 20 0 20 c)\clip(2,m 0 0 s 20 0 20 20 0 20 c)\blur11\fscx12\fscy13\fsp14\fs15\frx16\fry17\frz18\fnAlegreya\an5\pos(19,20)\fade(0,255,0,0,1000,2000,3000)\org(21,22)\t(\xbord23)\1c&HFF0000&\2c&H00FF00&\3c&H0000FF&\4c&HFF00FF&\1a&H22&\2a&H44&\3a&H66&\4a&H88&\be24\b1\i1\kt25\s1\u1\pbo26\q1\fe1}All tags 1{\p1}m 0 0 s 100 0 100 100 0 100 c{\p0}";
const MANY_SPANS: &str = r"{\xbord1}some text {\ybord2}some text {\xshad3}some text {\yshad4}some text {\fax5}some text {\fay6}some text {\clip(70,80,90,100)}some text {\iclip(20,20,30,30)}some text {\blur11}some text {\fscx12}some text {\fscy13}some text {\fsp14}some text {\fs15}some text {\frx16}some text {\fry17}some text {\frz18}some text {\fnAlegreya}some text {\an5}some text {\pos(19,20)}some text {\fade(0,255,0,0,1000,2000,3000)}some text {\org(21,22)}aaa {\t(\xbord23)}bbb {\1c&HFF0000&}ccc {\2c&H00FF00&}xyz {\b1}xyz {\i1}xyz {\q1}xyz {\fe1}the end{\p1}m 0 0 s 100 0 100 100 0 100 c{\p0}";

pub fn benchmark_tags(criterion: &mut Criterion) {
    const FEW: &str = r"\i1\c&HFF0000&";
    // parse_tags takes brace-group content, so strip the braces off the
    // big input's leading group
    let many = &MANY_TAGS[1..MANY_TAGS.find('}').expect("has a closing brace")];

    criterion.bench_function("tags: few", |bencher| {
        bencher.iter(|| parse_tags(black_box(FEW)));
    });
    criterion.bench_function("tags: many", |bencher| {
        bencher.iter(|| parse_tags(black_box(many)));
    });
}

pub fn benchmark_segment(criterion: &mut Criterion) {
    criterion.bench_function("segment: no tags", |bencher| {
        bencher.iter(|| blocks::parse(black_box(NO_TAGS)));
    });
    criterion.bench_function("segment: few tags", |bencher| {
        bencher.iter(|| blocks::parse(black_box(FEW_TAGS)));
    });
    criterion.bench_function("segment: many tags", |bencher| {
        bencher.iter(|| blocks::parse(black_box(MANY_TAGS)));
    });
    criterion.bench_function("segment: many spans", |bencher| {
        bencher.iter(|| blocks::parse(black_box(MANY_SPANS)));
    });
}

pub fn benchmark_set_tag(criterion: &mut Criterion) {
    let segmented = blocks::parse(MANY_SPANS);

    criterion.bench_function("set_tag: replace", |bencher| {
        bencher.iter(|| {
            let mut edited = segmented.clone();
            blocks::set_tag(
                &mut edited,
                black_box(Tag::B(Some("1".to_owned()))),
                black_box(1),
            )
        });
    });
    criterion.bench_function("set_tag: split plain", |bencher| {
        let plain = blocks::parse(NO_TAGS);
        bencher.iter(|| {
            let mut edited = plain.clone();
            blocks::set_tag(
                &mut edited,
                black_box(Tag::I(Some("1".to_owned()))),
                black_box(10),
            )
        });
    });
}
