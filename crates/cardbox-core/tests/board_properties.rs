//! Whole-board behaviour through the public API.

use cardbox_core::{
    Board, BoardConfig, Card, CardKind, ContentKind, Deck, Direction, MemoryClipboard, Orientation,
};
use kurbo::{Point, Rect};

const EPS: f64 = 1e-9;

fn rect_close(a: Rect, b: Rect) -> bool {
    (a.x0 - b.x0).abs() < EPS && (a.y0 - b.y0).abs() < EPS && (a.x1 - b.x1).abs() < EPS && (a.y1 - b.y1).abs() < EPS
}

fn populated() -> (Board, Vec<u32>) {
    let mut board = Board::new(Deck::new("props"), BoardConfig::default());
    let ids = vec![
        board.add_card(CardKind::Content, Point::new(15.0, 15.0)),
        board.add_card(CardKind::Header, Point::new(300.0, 15.0)),
        board.add_card(CardKind::Image, Point::new(300.0, 200.0)),
        board.add_card(CardKind::Content, Point::new(15.0, 200.0)),
    ];
    (board, ids)
}

#[test]
fn zoom_round_trip_restores_rects() {
    let (mut board, ids) = populated();
    let before: Vec<Rect> = ids.iter().map(|&id| board.card(id).unwrap().rect()).collect();

    for scale in [2.0, 0.5, 3.0, 0.7, 1.0] {
        board.set_scale(scale);
    }

    for (id, rect) in ids.iter().zip(before) {
        assert!(rect_close(board.card(*id).unwrap().rect(), rect));
    }
}

#[test]
fn exclusive_select_leaves_one_card() {
    let (mut board, ids) = populated();
    board.select_all();
    board.select(ids[2], true);
    assert_eq!(board.selected(), &[ids[2]]);

    board.unselect_all();
    board.select(ids[0], true);
    assert_eq!(board.selected(), &[ids[0]]);
}

#[test]
fn drag_select_picks_exactly_the_intersecting_cards() {
    let (mut board, _) = populated();
    let band = Rect::new(200.0, 30.0, 320.0, 210.0);

    board.drag_start(Point::new(band.x1, band.y1));
    board.drag_update(Point::new(250.0, 150.0));
    let mut picked = board.drag_end(Point::new(band.x0, band.y0));
    picked.sort();

    let mut expected: Vec<u32> = board
        .deck()
        .cards()
        .iter()
        .filter(|c| c.rect().intersect(band).area() > 0.0)
        .map(Card::id)
        .collect();
    expected.sort();

    assert_eq!(expected.len(), 4);
    assert_eq!(picked, expected);
    let mut selected = board.selected().to_vec();
    selected.sort();
    assert_eq!(selected, expected);
}

#[test]
fn nearest_walk_closes_the_square() {
    let mut board = Board::default();
    let tl = board.add_card(CardKind::Content, Point::new(15.0, 15.0));
    let bl = board.add_card(CardKind::Content, Point::new(15.0, 200.0));
    let tr = board.add_card(CardKind::Content, Point::new(300.0, 15.0));
    let br = board.add_card(CardKind::Content, Point::new(300.0, 200.0));

    board.select(tl, true);
    let walk: Vec<Option<u32>> = [Direction::Right, Direction::Down, Direction::Left, Direction::Up]
        .into_iter()
        .map(|dir| board.select_nearest(dir, true))
        .collect();

    assert_eq!(walk, vec![Some(tr), Some(br), Some(bl), Some(tl)]);
    assert_eq!(board.selected(), &[tl]);
}

#[test]
fn dump_load_reproduces_the_deck() {
    let (mut board, ids) = populated();
    if let Some(c) = board.card_mut(ids[0]).and_then(Card::as_content_mut) {
        c.set_title("Claim");
        c.set_content_kind(ContentKind::Assumption);
        c.set_rating(2);
        c.set_content("source: notes\nmore text");
    }
    board.select(ids[0], true);
    board.select(ids[3], false);
    board.group_selected();

    let dump = board.dump();
    let mut fresh = Deck::new("empty");
    fresh.load(&dump).unwrap();

    assert_eq!(fresh.len(), board.deck().len());
    assert_eq!(fresh.groups(), board.deck().groups());
    assert_eq!(fresh.dump(), dump);
    let content = fresh.card(ids[0]).and_then(Card::as_content).unwrap();
    assert_eq!(content.title(), "Claim");
    assert_eq!(content.content_kind(), ContentKind::Assumption);
    assert_eq!(content.rating(), 2);
}

#[test]
fn deleting_a_group_member_keeps_group_selection_safe() {
    let (mut board, ids) = populated();
    board.select(ids[0], true);
    board.select(ids[1], false);
    board.select(ids[2], false);
    let group = board.group_selected().unwrap();

    board.unselect_all();
    board.select(ids[1], true);
    assert_eq!(board.delete_selection(), 1);
    assert!(board.card(ids[1]).is_none());
    assert!(!board.is_selected(ids[1]));

    assert_eq!(board.select_group(group, true), 2);
    assert_eq!(board.selected(), &[ids[0], ids[2]]);
}

#[test]
fn copy_paste_adds_matching_cards() {
    let (mut board, ids) = populated();
    if let Some(c) = board.card_mut(ids[3]).and_then(Card::as_content_mut) {
        c.set_title("twin");
        c.set_content_kind(ContentKind::Fact);
        c.set_collapsed(true);
    }
    board.select(ids[3], true);
    board.select(ids[1], false);
    let before = board.deck().len();

    let mut clipboard = MemoryClipboard::new();
    assert_eq!(board.copy_selection(&mut clipboard), 2);
    let pasted = board.paste(&mut clipboard, None);

    assert_eq!(pasted.len(), 2);
    assert_eq!(board.deck().len(), before + 2);
    for (original, copy) in [ids[3], ids[1]].into_iter().zip(&pasted) {
        let a = board.card(original).unwrap();
        let b = board.card(*copy).unwrap();
        assert_ne!(a.id(), b.id());
        assert_eq!(a.kind(), b.kind());
        assert_eq!(a.size(), b.size());
        if let (Some(x), Some(y)) = (a.as_content(), b.as_content()) {
            assert_eq!(x.title(), y.title());
            assert_eq!(x.content_kind(), y.content_kind());
            assert_eq!(x.is_collapsed(), y.is_collapsed());
        }
        if let (Some(x), Some(y)) = (a.as_header(), b.as_header()) {
            assert_eq!(x.header(), y.header());
        }
    }
}

#[test]
fn arrange_horizontal_lines_cards_up() {
    let (mut board, ids) = populated();
    board.select(ids[2], true);
    board.select(ids[0], false);
    board.select(ids[3], false);
    board.arrange_selection(Orientation::Horizontal);

    let mut rects: Vec<Rect> = [ids[0], ids[2], ids[3]].iter().map(|&id| board.card(id).unwrap().rect()).collect();
    rects.sort_by(|a, b| a.x0.total_cmp(&b.x0));
    for pair in rects.windows(2) {
        assert!(pair[0].x0 <= pair[1].x0);
        assert!(pair[0].x1 <= pair[1].x0);
        assert!((pair[0].y0 - pair[1].y0).abs() < EPS);
    }
    assert!((rects[0].y0 - 15.0).abs() < EPS);
}
