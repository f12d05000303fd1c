//! Help popup: key bindings by category.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use super::overlays::centered_rect;

const POPUP_WIDTH: u16 = 80;
const POPUP_HEIGHT: u16 = 26;

struct Shortcut {
    key: &'static str,
    desc: &'static str,
}

struct Category {
    title: &'static str,
    shortcuts: &'static [Shortcut],
}

const NAVIGATION: Category = Category {
    title: "NAVEGAÇÃO",
    shortcuts: &[
        Shortcut {
            key: "Tab",
            desc: "Próximo painel",
        },
        Shortcut {
            key: "Shift+Tab",
            desc: "Painel anterior",
        },
        Shortcut {
            key: "Up/Down",
            desc: "Mover dentro do painel",
        },
        Shortcut {
            key: "Esc",
            desc: "Fechar popup",
        },
    ],
};

const MESSAGES: Category = Category {
    title: "MENSAGENS",
    shortcuts: &[
        Shortcut {
            key: "Enter",
            desc: "Escolher destinatário / Enviar",
        },
        Shortcut {
            key: "s",
            desc: "Sugestões de mensagem",
        },
        Shortcut {
            key: "F2",
            desc: "Ler em voz alta (liga/desliga)",
        },
        Shortcut {
            key: "F3",
            desc: "Voz feminina/masculina",
        },
        Shortcut {
            key: "F4",
            desc: "Anônimo/assinado",
        },
        Shortcut {
            key: "Ctrl+U",
            desc: "Limpar mensagem",
        },
    ],
};

const BOARD: Category = Category {
    title: "BALÕES",
    shortcuts: &[
        Shortcut {
            key: "b",
            desc: "Abrir/fechar painel",
        },
        Shortcut {
            key: "Left/Right",
            desc: "Página anterior/seguinte",
        },
        Shortcut {
            key: "v",
            desc: "Votar no balão",
        },
        Shortcut {
            key: "l",
            desc: "Curtir o balão",
        },
        Shortcut {
            key: "w",
            desc: "Identificar-se",
        },
    ],
};

const VIEWS: Category = Category {
    title: "CONSULTAS",
    shortcuts: &[
        Shortcut {
            key: "i",
            desc: "Mensagens da pessoa selecionada",
        },
        Shortcut {
            key: "p",
            desc: "Mensagens populares",
        },
        Shortcut {
            key: "t",
            desc: "Top 10",
        },
        Shortcut {
            key: "r",
            desc: "Ranking",
        },
    ],
};

const MISC: Category = Category {
    title: "OUTROS",
    shortcuts: &[
        Shortcut {
            key: "Ctrl+R",
            desc: "Recarregar pessoas e balões",
        },
        Shortcut {
            key: "Ctrl+D",
            desc: "Mostrar log",
        },
        Shortcut {
            key: "PgUp/PgDn",
            desc: "Rolar o log",
        },
        Shortcut {
            key: "q",
            desc: "Sair",
        },
        Shortcut {
            key: "?",
            desc: "Esta ajuda",
        },
    ],
};

pub fn render_help_popup(frame: &mut Frame) {
    let area = centered_rect(POPUP_WIDTH, POPUP_HEIGHT, frame.area());
    frame.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(Line::from(vec![
            Span::styled(
                " AJUDA ",
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled("(? para fechar) ", Style::default().fg(Color::Gray)),
        ]));

    let inner = block.inner(area);
    frame.render_widget(block, area);
    if inner.height == 0 || inner.width == 0 {
        return;
    }

    let [left, right] =
        Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)]).areas(inner);
    frame.render_widget(
        Paragraph::new(column(&[&NAVIGATION, &MESSAGES])),
        inset(left, 1, 1),
    );
    frame.render_widget(
        Paragraph::new(column(&[&BOARD, &VIEWS, &MISC])),
        inset(right, 1, 1),
    );
}

fn column(categories: &[&Category]) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for (idx, cat) in categories.iter().enumerate() {
        if idx > 0 {
            lines.push(Line::from(""));
        }
        lines.push(Line::from(Span::styled(
            cat.title,
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )));
        for sc in cat.shortcuts {
            lines.push(Line::from(vec![
                Span::styled(format!("{:<12}", sc.key), Style::default().fg(Color::Yellow)),
                Span::styled(sc.desc, Style::default().fg(Color::Gray)),
            ]));
        }
    }
    lines
}

fn inset(area: Rect, h: u16, v: u16) -> Rect {
    Rect::new(
        area.x + h,
        area.y + v,
        area.width.saturating_sub(h * 2),
        area.height.saturating_sub(v * 2),
    )
}
